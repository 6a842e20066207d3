//! The resource trait and the type identity used by registries.

use serde::{de::DeserializeOwned, Serialize};
use std::{
	any::TypeId,
	fmt::{self, Debug},
	hash::{Hash, Hasher},
};

use crate::models::Schema;

/// Identity of a Rust type.
///
/// Used as the registry key for definitions and storages, and as the resolution
/// key of type-based injections. Equality and hashing only consider the `TypeId`.
#[derive(Clone, Copy)]
pub struct TypeTag {
	id: TypeId,
	name: &'static str,
}

impl TypeTag {
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Fully qualified type name, for diagnostics only
	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for TypeTag {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl Debug for TypeTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TypeTag({})", self.name)
	}
}

/// A type whose instances are rows of static configuration data.
///
/// The associated constants play the role of declarative metadata: an empty string
/// means the value was not given.
///
/// ```ignore
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// struct Pet {
///     id: i32,
///     name: String,
/// }
///
/// impl Resource for Pet {
///     type Key = i32;
///     const NAME: &'static str = "Pet";
///
///     fn key(&self) -> i32 {
///         self.id
///     }
///
///     fn schema() -> Schema<Self> {
///         Schema::new()
///             .field("id", |pet: &mut Pet, id: i32| pet.id = id)
///             .field("name", |pet: &mut Pet, name: String| pet.name = name)
///     }
/// }
/// ```
pub trait Resource: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
	/// Identifier type of a record
	type Key: Eq + Hash + Clone + Debug + Send + Sync + 'static;

	/// Simple type name, used for default locations, sheet selection and exports
	const NAME: &'static str;

	/// Explicit location relative to the format root, without suffix
	const LOCATION: &'static str = "";

	/// Cache key under which the raw source bytes are shared
	const CACHE: &'static str = "";

	/// Returns the identifier of this record
	fn key(&self) -> Self::Key;

	/// Returns the declared fields of this type
	fn schema() -> Schema<Self>;
}
