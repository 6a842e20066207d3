//! Registries of definitions and storages.
//!
//! A resource type moves forward through three states: unregistered, registered
//! (a definition exists) and initialized (a filled storage exists). Registering a
//! type twice is an error. A registered type without storage gets one lazily on
//! first access; when several callers race, exactly one storage is installed and
//! every caller ends up with it.

#![allow(clippy::result_large_err)]

use dashmap::{mapref::entry::Entry, DashMap};
use std::{any::Any, collections::HashMap, sync::Arc};
use tracing::{debug, info};

use crate::{
	models::{Definition, Resource, TypeTag},
	repositories::{
		error::RepositoryError,
		loader::Loader,
		storage::{AnyStorage, Storage},
	},
	services::{context::ResolutionContext, locator::ResourceLocator},
};

/// Owns the definition and storage registries of a set of resource types
pub struct StorageManager {
	definitions: DashMap<TypeTag, Arc<dyn Any + Send + Sync>>,
	storages: DashMap<TypeTag, Arc<dyn AnyStorage>>,
	loader: Arc<Loader>,
}

impl StorageManager {
	pub fn new(locator: Arc<dyn ResourceLocator>, context: Arc<dyn ResolutionContext>) -> Self {
		Self {
			definitions: DashMap::new(),
			storages: DashMap::new(),
			loader: Arc::new(Loader::new(locator, context)),
		}
	}

	pub(crate) fn loader(&self) -> Arc<Loader> {
		self.loader.clone()
	}

	/// Registers `definition` without creating its storage
	pub fn define<T: Resource>(
		&self,
		definition: Definition<T>,
	) -> Result<Arc<Definition<T>>, RepositoryError> {
		let tag = TypeTag::of::<T>();
		let definition = Arc::new(definition);

		match self.definitions.entry(tag) {
			Entry::Occupied(_) => {
				return Err(RepositoryError::configuration_error(
					"resource type is already registered",
					None,
					Some(type_metadata::<T>()),
				));
			}
			Entry::Vacant(entry) => {
				entry.insert(definition.clone());
			}
		}

		debug!(
			resource = T::NAME,
			location = definition.location(),
			format = definition.format(),
			"defined resource"
		);
		Ok(definition)
	}

	/// Registers `definition` and creates its storage.
	///
	/// Records attached to the definition are used as decoded; otherwise the
	/// source is loaded now.
	pub async fn register<T: Resource>(
		&self,
		mut definition: Definition<T>,
	) -> Result<Arc<Storage<T>>, RepositoryError> {
		let preloaded = definition.take_preloaded();
		let definition = self.define(definition)?;

		let candidate = Arc::new(Storage::new(definition, self.loader.clone()));
		candidate.initialize(preloaded).await?;
		let storage = self.install(candidate)?;

		info!(resource = T::NAME, records = storage.len(), "registered storage");
		Ok(storage)
	}

	/// Returns the definition of `T`
	pub fn get_definition<T: Resource>(&self) -> Result<Arc<Definition<T>>, RepositoryError> {
		let definition = self
			.definitions
			.get(&TypeTag::of::<T>())
			.map(|entry| entry.value().clone())
			.ok_or_else(|| {
				RepositoryError::illegal_state(
					"resource type is not registered",
					None,
					Some(type_metadata::<T>()),
				)
			})?;

		definition.downcast::<Definition<T>>().map_err(|_| {
			RepositoryError::internal_error(
				"registered definition has an unexpected type",
				None,
				Some(type_metadata::<T>()),
			)
		})
	}

	/// Returns the storage of `T`, creating and filling it on first access
	pub async fn get_storage<T: Resource>(&self) -> Result<Arc<Storage<T>>, RepositoryError> {
		if let Some(storage) = self.installed::<T>()? {
			return Ok(storage);
		}

		let definition = self.get_definition::<T>()?;
		let candidate = Arc::new(Storage::new(definition, self.loader.clone()));
		candidate.initialize(None).await?;
		self.install(candidate)
	}

	/// Returns the record of `T` with the given key
	pub async fn get<T: Resource>(&self, key: &T::Key) -> Result<Option<Arc<T>>, RepositoryError> {
		Ok(self.get_storage::<T>().await?.get(key))
	}

	/// Returns all records of `T` in source order
	pub async fn get_all<T: Resource>(&self) -> Result<Vec<Arc<T>>, RepositoryError> {
		Ok(self.get_storage::<T>().await?.get_all())
	}

	/// Re-reads the source of `T` using its registered definition
	pub async fn reload<T: Resource>(&self) -> Result<(), RepositoryError> {
		if !self.is_registered::<T>() {
			return Err(RepositoryError::configuration_error(
				"cannot reload a resource type that is not registered",
				None,
				Some(type_metadata::<T>()),
			));
		}

		match self.installed::<T>()? {
			Some(storage) => storage.reload().await,
			None => self.get_storage::<T>().await.map(|_| ()),
		}
	}

	/// Snapshot of the storages created so far, in no particular order
	pub fn list_storages(&self) -> Vec<Arc<dyn AnyStorage>> {
		self.storages
			.iter()
			.map(|entry| entry.value().clone())
			.collect()
	}

	pub fn is_registered<T: Resource>(&self) -> bool {
		self.definitions.contains_key(&TypeTag::of::<T>())
	}

	pub fn is_initialized<T: Resource>(&self) -> bool {
		self.storages.contains_key(&TypeTag::of::<T>())
	}

	/// Stores source bytes under `key`
	pub fn put_cache(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
		self.loader.put_cache(key, bytes);
	}

	pub fn get_from_cache(&self, key: &str) -> Option<Arc<Vec<u8>>> {
		self.loader.get_from_cache(key)
	}

	fn installed<T: Resource>(&self) -> Result<Option<Arc<Storage<T>>>, RepositoryError> {
		let storage = self
			.storages
			.get(&TypeTag::of::<T>())
			.map(|entry| entry.value().clone());
		storage.map(downcast_storage::<T>).transpose()
	}

	/// Installs `candidate` unless a storage of the same type already exists, and
	/// returns the installed one.
	fn install<T: Resource>(
		&self,
		candidate: Arc<Storage<T>>,
	) -> Result<Arc<Storage<T>>, RepositoryError> {
		let installed = self
			.storages
			.entry(TypeTag::of::<T>())
			.or_insert_with(|| candidate.clone() as Arc<dyn AnyStorage>)
			.value()
			.clone();

		let storage = downcast_storage::<T>(installed)?;
		if !Arc::ptr_eq(&storage, &candidate) {
			debug!(resource = T::NAME, "discarding storage built by a losing caller");
		}
		Ok(storage)
	}
}

fn downcast_storage<T: Resource>(
	storage: Arc<dyn AnyStorage>,
) -> Result<Arc<Storage<T>>, RepositoryError> {
	storage.as_any().downcast::<Storage<T>>().map_err(|_| {
		RepositoryError::internal_error(
			"installed storage has an unexpected type",
			None,
			Some(type_metadata::<T>()),
		)
	})
}

fn type_metadata<T: Resource>() -> HashMap<String, String> {
	HashMap::from([
		("resource".to_string(), T::NAME.to_string()),
		("type".to_string(), std::any::type_name::<T>().to_string()),
	])
}
