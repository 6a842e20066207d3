//! Load plans of resource types.
//!
//! A [`Definition`] is built once per resource type from the type's declared
//! metadata and a [`FormatProfile`]. It fixes where the source lives, which reader
//! decodes it, and which fields are injected after decoding.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
	models::{ConfigError, DeclaredField, FieldKind, Injector, Resource, Schema, TypeTag},
	services::context::{ResolutionContext, SharedValue},
};

/// Format key plus the default root and suffix of its sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatProfile {
	pub format: String,
	pub location: String,
	pub suffix: String,
}

impl FormatProfile {
	pub fn new(
		format: impl Into<String>,
		location: impl Into<String>,
		suffix: impl Into<String>,
	) -> Self {
		Self {
			format: format.into(),
			location: location.into(),
			suffix: suffix.into(),
		}
	}
}

/// How the value of an injected field is looked up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolveKey {
	Name(String),
	Type(TypeTag),
}

impl fmt::Display for ResolveKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Name(name) => write!(f, "name:{}", name),
			Self::Type(tag) => write!(f, "type:{}", tag.name()),
		}
	}
}

/// Injection of one declared field
pub struct InjectionSpec<T> {
	field: &'static str,
	key: ResolveKey,
	value_type: TypeTag,
	injector: Injector<T>,
}

impl<T> InjectionSpec<T> {
	/// Builds the injection of `field`.
	///
	/// Fails when the field carries no injection marker.
	pub fn from_field(field: &DeclaredField<T>) -> Result<Self, ConfigError> {
		let FieldKind::Inject {
			marker,
			value_type,
			injector,
		} = field.kind()
		else {
			return Err(ConfigError::validation_error(
				"field has no injection marker",
				None,
				Some(HashMap::from([(
					"field".to_string(),
					field.name().to_string(),
				)])),
			));
		};

		let key = match marker.name() {
			Some(name) => ResolveKey::Name(name.to_string()),
			None => ResolveKey::Type(*value_type),
		};

		Ok(Self {
			field: field.name(),
			key,
			value_type: *value_type,
			injector: injector.clone(),
		})
	}

	pub fn field(&self) -> &'static str {
		self.field
	}

	pub fn key(&self) -> &ResolveKey {
		&self.key
	}

	pub fn value_type(&self) -> TypeTag {
		self.value_type
	}

	pub fn is_static(&self) -> bool {
		matches!(self.injector, Injector::Static(_))
	}

	/// Looks the value up in `context`
	pub fn resolve(&self, context: &dyn ResolutionContext) -> Result<SharedValue, ConfigError> {
		let value = match &self.key {
			ResolveKey::Name(name) => context.resolve_by_name(name),
			ResolveKey::Type(tag) => context.resolve_by_type(*tag),
		};
		value.ok_or_else(|| {
			ConfigError::validation_error(
				"no value available for injected field",
				None,
				Some(self.metadata()),
			)
		})
	}

	/// Injects `value` into one record
	pub fn apply(&self, record: &mut T, value: SharedValue) -> Result<(), ConfigError> {
		let applied = match &self.injector {
			Injector::Instance(inject) => inject(record, value),
			Injector::Static(_) => {
				return Err(ConfigError::validation_error(
					"static field cannot be injected into a record",
					None,
					Some(self.metadata()),
				));
			}
		};
		self.check_applied(applied)
	}

	/// Injects `value` into the type-level slot
	pub fn apply_static(&self, value: SharedValue) -> Result<(), ConfigError> {
		let applied = match &self.injector {
			Injector::Static(inject) => inject(value),
			Injector::Instance(_) => {
				return Err(ConfigError::validation_error(
					"instance field cannot be injected statically",
					None,
					Some(self.metadata()),
				));
			}
		};
		self.check_applied(applied)
	}

	fn check_applied(&self, applied: bool) -> Result<(), ConfigError> {
		if applied {
			Ok(())
		} else {
			Err(ConfigError::validation_error(
				"resolved value does not match the field type",
				None,
				Some(self.metadata()),
			))
		}
	}

	fn metadata(&self) -> HashMap<String, String> {
		HashMap::from([
			("field".to_string(), self.field.to_string()),
			("key".to_string(), self.key.to_string()),
			("value_type".to_string(), self.value_type.name().to_string()),
		])
	}
}

impl<T> fmt::Debug for InjectionSpec<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InjectionSpec")
			.field("field", &self.field)
			.field("key", &self.key)
			.field("static", &self.is_static())
			.finish()
	}
}

/// Immutable load plan of a resource type
pub struct Definition<T: Resource> {
	location: String,
	format: String,
	cache_key: Option<String>,
	schema: Arc<Schema<T>>,
	injections: Vec<InjectionSpec<T>>,
	preloaded: Option<Vec<T>>,
}

impl<T: Resource> Definition<T> {
	/// Builds the definition of `T` from its declared metadata
	pub fn new(profile: &FormatProfile) -> Result<Self, ConfigError> {
		Self::with_metadata(profile, T::LOCATION, T::CACHE)
	}

	/// Builds the definition of `T` with explicit location and cache metadata.
	///
	/// Blank values mean "not given".
	pub fn with_metadata(
		profile: &FormatProfile,
		location: &str,
		cache: &str,
	) -> Result<Self, ConfigError> {
		if profile.format.trim().is_empty() {
			return Err(ConfigError::validation_error(
				"format profile has no format key",
				None,
				Some(HashMap::from([("resource".to_string(), T::NAME.to_string())])),
			));
		}
		if profile.location.trim().is_empty() {
			return Err(ConfigError::validation_error(
				"format profile has no location",
				None,
				Some(HashMap::from([
					("resource".to_string(), T::NAME.to_string()),
					("format".to_string(), profile.format.clone()),
				])),
			));
		}

		let schema = T::schema();
		let injections = schema
			.fields()
			.iter()
			.filter(|field| field.marker().is_some())
			.map(InjectionSpec::from_field)
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			location: resolve_location(profile, T::NAME, location),
			format: profile.format.clone(),
			cache_key: (!cache.trim().is_empty()).then(|| cache.to_string()),
			schema: Arc::new(schema),
			injections,
			preloaded: None,
		})
	}

	pub fn target(&self) -> TypeTag {
		TypeTag::of::<T>()
	}

	/// Simple type name
	pub fn name(&self) -> &'static str {
		T::NAME
	}

	pub fn location(&self) -> &str {
		&self.location
	}

	pub fn format(&self) -> &str {
		&self.format
	}

	pub fn cache_key(&self) -> Option<&str> {
		self.cache_key.as_deref()
	}

	pub fn schema(&self) -> &Arc<Schema<T>> {
		&self.schema
	}

	/// Injections applied to every decoded record
	pub fn injects(&self) -> impl Iterator<Item = &InjectionSpec<T>> {
		self.injections.iter().filter(|spec| !spec.is_static())
	}

	/// Injections applied once for the type
	pub fn static_injects(&self) -> impl Iterator<Item = &InjectionSpec<T>> {
		self.injections.iter().filter(|spec| spec.is_static())
	}

	/// Attaches records decoded ahead of registration
	pub fn attach(&mut self, records: Vec<T>) {
		self.preloaded = Some(records);
	}

	pub fn is_preloaded(&self) -> bool {
		self.preloaded.is_some()
	}

	/// Takes the attached records, leaving none behind
	pub fn take_preloaded(&mut self) -> Option<Vec<T>> {
		self.preloaded.take()
	}
}

impl<T: Resource> fmt::Debug for Definition<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Definition")
			.field("name", &T::NAME)
			.field("location", &self.location)
			.field("format", &self.format)
			.field("cache_key", &self.cache_key)
			.field("injections", &self.injections)
			.finish()
	}
}

fn resolve_location(profile: &FormatProfile, name: &str, explicit: &str) -> String {
	let base = if explicit.trim().is_empty() {
		name
	} else {
		explicit.strip_prefix('/').unwrap_or(explicit)
	};
	let root = profile.location.trim_end_matches('/');
	if profile.suffix.is_empty() {
		format!("{}/{}", root, base)
	} else {
		format!("{}/{}.{}", root, base, profile.suffix)
	}
}
