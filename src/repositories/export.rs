//! JSON export of storage contents.
//!
//! Writes one `<NAME>.json` file per initialized storage. A storage that fails to
//! serialize or write is logged and skipped; the others are still written.

#![allow(clippy::result_large_err)]

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};
use tracing::{error, info};

use crate::{
	models::StorageConfig,
	repositories::{error::RepositoryError, manager::StorageManager},
};

/// Outcome of an export
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportReport {
	/// Files written, sorted
	pub written: Vec<PathBuf>,
	/// Simple names of the resource types that could not be exported, sorted
	pub failed: Vec<String>,
}

impl ExportReport {
	pub fn is_complete(&self) -> bool {
		self.failed.is_empty()
	}
}

impl StorageManager {
	/// Writes the contents of every storage to `<dir>/<NAME>.json`.
	///
	/// Fails only when `dir` cannot be created.
	pub async fn write_json(&self, dir: &Path) -> Result<ExportReport, RepositoryError> {
		tokio::fs::create_dir_all(dir).await.map_err(|e| {
			RepositoryError::io_error(
				format!("failed to create export directory: {}", e),
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					dir.display().to_string(),
				)])),
			)
		})?;

		let mut report = ExportReport::default();
		for storage in self.list_storages() {
			let path = dir.join(format!("{}.json", storage.name()));

			let content = match storage.to_json() {
				Ok(content) => content,
				Err(e) => {
					error!(
						resource = storage.name(),
						error = %e,
						"failed to serialize storage, skipping"
					);
					report.failed.push(storage.name().to_string());
					continue;
				}
			};

			match tokio::fs::write(&path, content).await {
				Ok(()) => report.written.push(path),
				Err(e) => {
					error!(
						resource = storage.name(),
						path = %path.display(),
						error = %e,
						"failed to write export file, skipping"
					);
					report.failed.push(storage.name().to_string());
				}
			}
		}

		report.written.sort();
		report.failed.sort();
		info!(
			dir = %dir.display(),
			written = report.written.len(),
			failed = report.failed.len(),
			"exported storages"
		);
		Ok(report)
	}

	/// Writes every storage to the configured export directory
	pub async fn export(&self, config: &StorageConfig) -> Result<ExportReport, RepositoryError> {
		let dir = config.export_dir.as_deref().ok_or_else(|| {
			RepositoryError::configuration_error("no export directory configured", None, None)
		})?;
		self.write_json(dir).await
	}
}
