//! Source fetching, decoding and injection shared by every storage of a manager.

#![allow(clippy::result_large_err)]

use dashmap::DashMap;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

use crate::{
	models::{ConfigError, Definition, Resource},
	repositories::error::RepositoryError,
	services::{
		context::{ResolutionContext, SharedValue},
		decoder::{ReaderHolder, ResourceReader},
		locator::ResourceLocator,
	},
};

/// Turns definitions into decoded, injected records
pub struct Loader {
	locator: Arc<dyn ResourceLocator>,
	readers: ReaderHolder,
	context: Arc<dyn ResolutionContext>,
	cache: DashMap<String, Arc<Vec<u8>>>,
}

/// Where the bytes of a load come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
	/// Cached bytes when the definition has a cache key, the location otherwise
	Cached,
	/// Always the location; refreshes the cache entry
	Location,
}

impl Loader {
	pub fn new(locator: Arc<dyn ResourceLocator>, context: Arc<dyn ResolutionContext>) -> Self {
		Self {
			locator,
			readers: ReaderHolder::new(),
			context,
			cache: DashMap::new(),
		}
	}

	pub fn readers(&self) -> &ReaderHolder {
		&self.readers
	}

	pub fn put_cache(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
		self.cache.insert(key.into(), Arc::new(bytes.into()));
	}

	pub fn get_from_cache(&self, key: &str) -> Option<Arc<Vec<u8>>> {
		self.cache.get(key).map(|entry| entry.value().clone())
	}

	/// Fetches and decodes the records of `definition`
	pub async fn load<T: Resource>(
		&self,
		definition: &Definition<T>,
		source: Source,
	) -> Result<Vec<T>, RepositoryError> {
		let bytes = self.fetch(definition, source).await?;
		self.decode(definition, bytes).await
	}

	async fn fetch<T: Resource>(
		&self,
		definition: &Definition<T>,
		source: Source,
	) -> Result<Arc<Vec<u8>>, RepositoryError> {
		if source == Source::Cached {
			if let Some(bytes) = definition.cache_key().and_then(|key| self.get_from_cache(key)) {
				debug!(resource = T::NAME, cache_key = ?definition.cache_key(), "using cached source");
				return Ok(bytes);
			}
		}

		let bytes = self
			.locator
			.open(definition.location())
			.await
			.map_err(|e| {
				RepositoryError::io_error(
					format!("failed to open resource source: {}", e),
					Some(Box::new(e)),
					Some(metadata(definition)),
				)
			})?;
		let bytes = Arc::new(bytes);

		if let Some(key) = definition.cache_key() {
			self.cache.insert(key.to_string(), bytes.clone());
		}

		Ok(bytes)
	}

	async fn decode<T: Resource>(
		&self,
		definition: &Definition<T>,
		bytes: Arc<Vec<u8>>,
	) -> Result<Vec<T>, RepositoryError> {
		let reader = *self.readers.get(definition.format()).ok_or_else(|| {
			RepositoryError::configuration_error(
				format!(
					"no reader for format, expected one of: {}",
					self.readers.formats().join(", ")
				),
				None,
				Some(metadata(definition)),
			)
		})?;

		let schema = definition.schema().clone();
		let records = tokio::task::spawn_blocking(move || reader.read::<T>(&bytes, &schema))
			.await
			.map_err(|e| {
				RepositoryError::internal_error(
					format!("decode task failed: {}", e),
					Some(Box::new(e)),
					Some(metadata(definition)),
				)
			})?
			.map_err(|e| {
				RepositoryError::decode_error(
					format!("failed to decode resource: {}", e),
					Some(Box::new(e)),
					Some(metadata(definition)),
				)
			})?;

		debug!(
			resource = T::NAME,
			format = definition.format(),
			records = records.len(),
			"decoded resource"
		);
		Ok(records)
	}

	/// Resolves the injections of `definition` once and applies them.
	///
	/// Static injections are applied to the type-level slot, instance injections to
	/// every record.
	pub fn inject<T: Resource>(
		&self,
		definition: &Definition<T>,
		records: &mut [T],
	) -> Result<(), RepositoryError> {
		let failed = |e: ConfigError| {
			RepositoryError::configuration_error(
				format!("failed to inject field: {}", e),
				Some(Box::new(e)),
				Some(metadata(definition)),
			)
		};

		for spec in definition.static_injects() {
			let value = spec.resolve(self.context.as_ref()).map_err(failed)?;
			spec.apply_static(value).map_err(failed)?;
		}

		let resolved = definition
			.injects()
			.map(|spec| Ok((spec, spec.resolve(self.context.as_ref())?)))
			.collect::<Result<Vec<(_, SharedValue)>, ConfigError>>()
			.map_err(failed)?;

		if resolved.is_empty() {
			return Ok(());
		}
		for record in records.iter_mut() {
			for (spec, value) in &resolved {
				spec.apply(record, value.clone()).map_err(failed)?;
			}
		}

		Ok(())
	}
}

fn metadata<T: Resource>(definition: &Definition<T>) -> HashMap<String, String> {
	HashMap::from([
		("resource".to_string(), T::NAME.to_string()),
		("location".to_string(), definition.location().to_string()),
		("format".to_string(), definition.format().to_string()),
	])
}
