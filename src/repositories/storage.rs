//! Per-type indexed storage.
//!
//! A [`Storage`] holds the records of one resource type in source order, indexed
//! by [`Resource::key`]. Contents are published as one immutable snapshot that a
//! reload swaps atomically, so lookups never wait for a reload.

#![allow(clippy::result_large_err)]

use arc_swap::ArcSwap;
use std::{any::Any, collections::HashMap, fmt, sync::Arc};
use tracing::info;

use crate::{
	models::{Definition, Resource, TypeTag},
	repositories::{
		error::RepositoryError,
		loader::{Loader, Source},
	},
};

struct Snapshot<T: Resource> {
	records: Vec<Arc<T>>,
	index: HashMap<T::Key, usize>,
}

impl<T: Resource> Snapshot<T> {
	fn empty() -> Self {
		Self {
			records: Vec::new(),
			index: HashMap::new(),
		}
	}

	fn build(records: Vec<T>) -> Result<Self, RepositoryError> {
		let mut index = HashMap::with_capacity(records.len());
		for (position, record) in records.iter().enumerate() {
			let key = record.key();
			if index.contains_key(&key) {
				return Err(RepositoryError::decode_error(
					"duplicate record key",
					None,
					Some(HashMap::from([
						("resource".to_string(), T::NAME.to_string()),
						("key".to_string(), format!("{:?}", key)),
					])),
				));
			}
			index.insert(key, position);
		}

		Ok(Self {
			records: records.into_iter().map(Arc::new).collect(),
			index,
		})
	}
}

/// Records of one resource type
pub struct Storage<T: Resource> {
	definition: Arc<Definition<T>>,
	loader: Arc<Loader>,
	snapshot: ArcSwap<Snapshot<T>>,
}

impl<T: Resource> Storage<T> {
	/// Creates an empty storage for `definition`
	pub fn new(definition: Arc<Definition<T>>, loader: Arc<Loader>) -> Self {
		Self {
			definition,
			loader,
			snapshot: ArcSwap::from_pointee(Snapshot::empty()),
		}
	}

	/// Fills the storage.
	///
	/// `preloaded` records are used as decoded; otherwise the source is loaded,
	/// preferring cached bytes.
	pub async fn initialize(&self, preloaded: Option<Vec<T>>) -> Result<(), RepositoryError> {
		let records = match preloaded {
			Some(records) => records,
			None => self.loader.load(&self.definition, Source::Cached).await?,
		};
		self.install(records)
	}

	/// Re-reads the source from its location and replaces the contents
	pub async fn reload(&self) -> Result<(), RepositoryError> {
		let records = self
			.loader
			.load(&self.definition, Source::Location)
			.await?;
		self.install(records)?;
		info!(resource = T::NAME, records = self.len(), "reloaded storage");
		Ok(())
	}

	fn install(&self, mut records: Vec<T>) -> Result<(), RepositoryError> {
		self.loader.inject(&self.definition, &mut records)?;
		self.snapshot.store(Arc::new(Snapshot::build(records)?));
		Ok(())
	}

	pub fn definition(&self) -> &Arc<Definition<T>> {
		&self.definition
	}

	/// Returns the record with the given key
	pub fn get(&self, key: &T::Key) -> Option<Arc<T>> {
		let snapshot = self.snapshot.load();
		snapshot
			.index
			.get(key)
			.map(|position| snapshot.records[*position].clone())
	}

	/// Returns all records in source order
	pub fn get_all(&self) -> Vec<Arc<T>> {
		self.snapshot.load().records.clone()
	}

	pub fn len(&self) -> usize {
		self.snapshot.load().records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<T: Resource> fmt::Debug for Storage<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Storage")
			.field("resource", &T::NAME)
			.field("records", &self.len())
			.finish()
	}
}

/// Type-erased view of a storage, as kept by the manager
pub trait AnyStorage: Send + Sync {
	fn target(&self) -> TypeTag;

	/// Simple name of the resource type
	fn name(&self) -> &'static str;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Serializes all records as a JSON array
	fn to_json(&self) -> Result<Vec<u8>, serde_json::Error>;

	fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Resource> AnyStorage for Storage<T> {
	fn target(&self) -> TypeTag {
		TypeTag::of::<T>()
	}

	fn name(&self) -> &'static str {
		T::NAME
	}

	fn len(&self) -> usize {
		Storage::<T>::len(self)
	}

	fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
		let snapshot = self.snapshot.load();
		let records: Vec<&T> = snapshot.records.iter().map(|r| r.as_ref()).collect();
		serde_json::to_vec_pretty(&records)
	}

	fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}
