//! Resolution of values for injected fields.
//!
//! The storage layer never looks values up implicitly; it asks the
//! [`ResolutionContext`] handed to the storage manager, by name or by type.

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use crate::models::TypeTag;

/// Shared, type-erased value handed to injectors
pub type SharedValue = Arc<dyn Any + Send + Sync>;

/// Supplies values for injected fields
pub trait ResolutionContext: Send + Sync {
	/// Resolves a value registered under `name`
	fn resolve_by_name(&self, name: &str) -> Option<SharedValue>;

	/// Resolves the value registered for the type identified by `tag`
	fn resolve_by_type(&self, tag: TypeTag) -> Option<SharedValue>;
}

/// Map-backed resolution context
#[derive(Clone, Default)]
pub struct BeanContext {
	named: HashMap<String, SharedValue>,
	typed: HashMap<TypeTag, SharedValue>,
}

impl BeanContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `value` under `name`
	pub fn with_named<V: Any + Send + Sync>(mut self, name: impl Into<String>, value: V) -> Self {
		self.named.insert(name.into(), Arc::new(value));
		self
	}

	/// Registers `value` as the value of its own type
	pub fn with_typed<V: Any + Send + Sync>(mut self, value: V) -> Self {
		self.typed.insert(TypeTag::of::<V>(), Arc::new(value));
		self
	}
}

impl ResolutionContext for BeanContext {
	fn resolve_by_name(&self, name: &str) -> Option<SharedValue> {
		self.named.get(name).cloned()
	}

	fn resolve_by_type(&self, tag: TypeTag) -> Option<SharedValue> {
		self.typed.get(&tag).cloned()
	}
}

impl fmt::Debug for BeanContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut named: Vec<_> = self.named.keys().collect();
		named.sort();
		let typed: Vec<_> = self.typed.keys().map(TypeTag::name).collect();
		f.debug_struct("BeanContext")
			.field("named", &named)
			.field("typed", &typed)
			.finish()
	}
}
