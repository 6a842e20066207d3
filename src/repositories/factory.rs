//! Bulk construction of a storage manager.
//!
//! All sources are read concurrently, one task per definition, and awaited in
//! completion order. Registration only starts once every read succeeded, so a
//! failed bulk load never leaves a partially filled manager behind.

#![allow(clippy::result_large_err)]

use async_trait::async_trait;
use std::{
	collections::{HashMap, HashSet},
	sync::Arc,
};
use tokio::task::JoinSet;
use tracing::info;

use crate::{
	models::{Definition, Resource, StorageConfig, TypeTag},
	repositories::{
		error::RepositoryError,
		loader::{Loader, Source},
		manager::StorageManager,
	},
	services::{
		context::ResolutionContext,
		locator::{FileSystemLocator, ResourceLocator},
	},
};

/// A definition waiting for its source to be read
#[async_trait]
trait PendingDefinition: Send + Sync {
	fn target(&self) -> TypeTag;

	fn name(&self) -> &'static str;

	async fn load(
		self: Box<Self>,
		loader: Arc<Loader>,
	) -> Result<Box<dyn LoadedDefinition>, RepositoryError>;
}

/// A definition carrying its decoded records
#[async_trait]
trait LoadedDefinition: Send {
	async fn register(self: Box<Self>, manager: &StorageManager) -> Result<(), RepositoryError>;
}

struct Typed<T: Resource>(Definition<T>);

#[async_trait]
impl<T: Resource> PendingDefinition for Typed<T> {
	fn target(&self) -> TypeTag {
		TypeTag::of::<T>()
	}

	fn name(&self) -> &'static str {
		T::NAME
	}

	async fn load(
		self: Box<Self>,
		loader: Arc<Loader>,
	) -> Result<Box<dyn LoadedDefinition>, RepositoryError> {
		let mut definition = self.0;
		let records = loader.load(&definition, Source::Cached).await?;
		definition.attach(records);
		Ok(Box::new(Typed(definition)))
	}
}

#[async_trait]
impl<T: Resource> LoadedDefinition for Typed<T> {
	async fn register(self: Box<Self>, manager: &StorageManager) -> Result<(), RepositoryError> {
		manager.register(self.0).await.map(|_| ())
	}
}

/// Collects definitions and builds a [`StorageManager`] from them
pub struct StorageManagerFactory {
	locator: Arc<dyn ResourceLocator>,
	context: Arc<dyn ResolutionContext>,
	config: Option<StorageConfig>,
	pending: Vec<Box<dyn PendingDefinition>>,
	cache: Vec<(String, Vec<u8>)>,
}

impl StorageManagerFactory {
	pub fn new(locator: Arc<dyn ResourceLocator>, context: Arc<dyn ResolutionContext>) -> Self {
		Self {
			locator,
			context,
			config: None,
			pending: Vec::new(),
			cache: Vec::new(),
		}
	}

	/// Creates a factory reading sources below the configured resource directory
	pub fn from_config(config: StorageConfig, context: Arc<dyn ResolutionContext>) -> Self {
		let locator = Arc::new(FileSystemLocator::new(config.resource_dir.clone()));
		Self {
			config: Some(config),
			..Self::new(locator, context)
		}
	}

	/// Adds a definition to the bulk load
	pub fn with_definition<T: Resource>(mut self, definition: Definition<T>) -> Self {
		self.pending.push(Box::new(Typed(definition)));
		self
	}

	/// Adds `T` using the configured format profile called `profile`
	pub fn with_resource<T: Resource>(self, profile: &str) -> Result<Self, RepositoryError> {
		let format = self
			.config
			.as_ref()
			.and_then(|config| config.format(profile))
			.ok_or_else(|| {
				RepositoryError::configuration_error(
					"missing format profile",
					None,
					Some(HashMap::from([
						("resource".to_string(), T::NAME.to_string()),
						("profile".to_string(), profile.to_string()),
					])),
				)
			})?;
		let definition = Definition::<T>::new(format)?;
		Ok(self.with_definition(definition))
	}

	/// Seeds the cache of the built manager
	pub fn with_cache(mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
		self.cache.push((key.into(), bytes.into()));
		self
	}

	/// Reads every source concurrently, then registers all definitions.
	///
	/// The first failed read aborts the remaining reads and the whole build.
	pub async fn build(self) -> Result<StorageManager, RepositoryError> {
		let mut seen = HashSet::new();
		for pending in &self.pending {
			if !seen.insert(pending.target()) {
				return Err(RepositoryError::configuration_error(
					"resource type is defined more than once",
					None,
					Some(HashMap::from([(
						"resource".to_string(),
						pending.name().to_string(),
					)])),
				));
			}
		}

		let manager = StorageManager::new(self.locator, self.context);
		for (key, bytes) in self.cache {
			manager.put_cache(key, bytes);
		}

		let total = self.pending.len();
		info!(definitions = total, "loading resources");

		let mut tasks = JoinSet::new();
		for (position, pending) in self.pending.into_iter().enumerate() {
			let loader = manager.loader();
			tasks.spawn(async move { (position, pending.load(loader).await) });
		}

		let mut loaded = Vec::with_capacity(total);
		while let Some(joined) = tasks.join_next().await {
			let outcome = joined
				.map_err(|e| {
					RepositoryError::internal_error(
						format!("resource load task failed: {}", e),
						Some(Box::new(e)),
						None,
					)
				})
				.and_then(|(position, result)| result.map(|definition| (position, definition)));

			match outcome {
				Ok(definition) => loaded.push(definition),
				Err(e) => {
					tasks.abort_all();
					return Err(e);
				}
			}
		}

		loaded.sort_by_key(|(position, _)| *position);
		for (_, definition) in loaded {
			definition.register(&manager).await?;
		}

		info!(storages = total, "resources loaded");
		Ok(manager)
	}
}
