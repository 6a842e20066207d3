//! Storage configuration loading and validation.
//!
//! ```json
//! {
//!   "resource_dir": "./data",
//!   "export_dir": "./export",
//!   "formats": {
//!     "excel": { "format": "excel", "location": "resources", "suffix": "xlsx" },
//!     "json": { "format": "json", "location": "json", "suffix": "json" }
//!   }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};

use crate::{
	models::{ConfigError, ConfigLoader, FormatProfile},
	services::decoder::ReaderHolder,
};

/// Overrides `resource_dir`
pub const ENV_RESOURCE_DIR: &str = "STORAGE_RESOURCE_DIR";
/// Overrides `export_dir`
pub const ENV_EXPORT_DIR: &str = "STORAGE_EXPORT_DIR";

/// Where resources are read from, where exports go, and the known format profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
	/// Base directory locations are resolved against
	pub resource_dir: PathBuf,
	/// Target directory of JSON exports
	#[serde(default)]
	pub export_dir: Option<PathBuf>,
	/// Format profiles by profile name
	pub formats: HashMap<String, FormatProfile>,
}

impl StorageConfig {
	/// Returns the format profile registered under `name`
	pub fn format(&self, name: &str) -> Option<&FormatProfile> {
		self.formats.get(name)
	}

	/// Applies directory overrides looked up through `lookup`
	pub fn apply_overrides<F>(&mut self, lookup: F)
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(dir) = lookup(ENV_RESOURCE_DIR).filter(|v| !v.trim().is_empty()) {
			self.resource_dir = PathBuf::from(dir);
		}
		if let Some(dir) = lookup(ENV_EXPORT_DIR).filter(|v| !v.trim().is_empty()) {
			self.export_dir = Some(PathBuf::from(dir));
		}
	}
}

#[async_trait]
impl ConfigLoader for StorageConfig {
	/// Load the storage configuration from a JSON file
	///
	/// Environment overrides are applied after `.env` is loaded, then the result
	/// is validated.
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let metadata = || {
			Some(HashMap::from([(
				"path".to_string(),
				path.display().to_string(),
			)]))
		};

		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(
				"storage config must be a JSON file",
				None,
				metadata(),
			));
		}

		let content = tokio::fs::read(path).await.map_err(|e| {
			ConfigError::file_error(
				format!("failed to read storage config file: {}", e),
				Some(Box::new(e)),
				metadata(),
			)
		})?;
		let mut config: StorageConfig = serde_json::from_slice(&content).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse storage config: {}", e),
				Some(Box::new(e)),
				metadata(),
			)
		})?;

		dotenvy::dotenv().ok();
		config.apply_overrides(|key| std::env::var(key).ok());

		config.validate()?;

		Ok(config)
	}

	/// Validate the storage configuration
	///
	/// Ensures that:
	/// - The resource directory is given
	/// - At least one format profile exists
	/// - Every profile has a non-blank format, location and suffix
	/// - Every profile's format has a reader
	fn validate(&self) -> Result<(), ConfigError> {
		if self.resource_dir.as_os_str().is_empty() {
			return Err(ConfigError::validation_error(
				"Resource directory is required",
				None,
				None,
			));
		}

		if self.formats.is_empty() {
			return Err(ConfigError::validation_error(
				"At least one format profile is required",
				None,
				None,
			));
		}

		let readers = ReaderHolder::new();
		let mut names: Vec<_> = self.formats.keys().collect();
		names.sort();

		for name in names {
			let profile = &self.formats[name];
			let metadata = Some(HashMap::from([("profile".to_string(), name.clone())]));

			for (field, value) in [
				("format", &profile.format),
				("location", &profile.location),
				("suffix", &profile.suffix),
			] {
				if value.trim().is_empty() {
					return Err(ConfigError::validation_error(
						format!("Format profile {} must not be blank", field),
						None,
						metadata,
					));
				}
			}

			if !readers.supports(&profile.format) {
				return Err(ConfigError::validation_error(
					format!(
						"Format must be one of: {}",
						readers.formats().join(", ")
					),
					None,
					metadata,
				));
			}
		}

		Ok(())
	}
}
