//! Statically declared field tables.
//!
//! A [`Schema`] lists the fields of a resource type once per type. Column fields
//! carry a setter whose value type selects the coercion rule applied to cell text;
//! injected fields carry a marker and an injector receiving a resolved value.

use serde::de::DeserializeOwned;
use std::{any::Any, fmt, sync::Arc};

use crate::{
	models::TypeTag,
	services::decoder::{coerce_object, Coerce, CoerceError},
};

/// Assigns coerced cell text to a field of a record
pub type ColumnSetter<T> = Arc<dyn Fn(&mut T, &str) -> Result<(), CoerceError> + Send + Sync>;

type InstanceInjectFn<T> = dyn Fn(&mut T, Arc<dyn Any + Send + Sync>) -> bool + Send + Sync;
type StaticInjectFn = dyn Fn(Arc<dyn Any + Send + Sync>) -> bool + Send + Sync;

/// Receives a resolved value for an injected field.
///
/// Both variants return `false` when the value is not of the field's type.
pub enum Injector<T> {
	/// Applied to every decoded record
	Instance(Arc<InstanceInjectFn<T>>),
	/// Applied once for the whole type
	Static(Arc<StaticInjectFn>),
}

impl<T> Clone for Injector<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Instance(f) => Self::Instance(f.clone()),
			Self::Static(f) => Self::Static(f.clone()),
		}
	}
}

/// Injection marker of a declared field.
///
/// A non-empty name resolves the value by name, otherwise the field's value type
/// is used as the resolution key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inject {
	name: Option<String>,
}

impl Inject {
	pub fn by_type() -> Self {
		Self { name: None }
	}

	pub fn named(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			name: (!name.trim().is_empty()).then_some(name),
		}
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

/// What a declared field is used for
pub enum FieldKind<T> {
	/// Filled from a tabular column
	Column(ColumnSetter<T>),
	/// Filled from the resolution context
	Inject {
		marker: Inject,
		value_type: TypeTag,
		injector: Injector<T>,
	},
}

/// One declared field of a resource type
pub struct DeclaredField<T> {
	name: &'static str,
	kind: FieldKind<T>,
}

impl<T> DeclaredField<T> {
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn kind(&self) -> &FieldKind<T> {
		&self.kind
	}

	pub fn is_static(&self) -> bool {
		matches!(
			self.kind,
			FieldKind::Inject {
				injector: Injector::Static(_),
				..
			}
		)
	}

	/// Returns the injection marker, if the field carries one
	pub fn marker(&self) -> Option<&Inject> {
		match &self.kind {
			FieldKind::Inject { marker, .. } => Some(marker),
			FieldKind::Column(_) => None,
		}
	}

	pub fn column(&self) -> Option<&ColumnSetter<T>> {
		match &self.kind {
			FieldKind::Column(setter) => Some(setter),
			FieldKind::Inject { .. } => None,
		}
	}
}

impl<T> fmt::Debug for DeclaredField<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match &self.kind {
			FieldKind::Column(_) => "column".to_string(),
			FieldKind::Inject { marker, .. } => match marker.name() {
				Some(name) => format!("inject(name={})", name),
				None => "inject(type)".to_string(),
			},
		};
		f.debug_struct("DeclaredField")
			.field("name", &self.name)
			.field("kind", &kind)
			.field("static", &self.is_static())
			.finish()
	}
}

/// Declared fields of a resource type, in declaration order
pub struct Schema<T> {
	fields: Vec<DeclaredField<T>>,
}

impl<T: 'static> Schema<T> {
	pub fn new() -> Self {
		Self { fields: Vec::new() }
	}

	/// Declares a column field coerced with the rule of `V`
	pub fn field<V, F>(mut self, name: &'static str, setter: F) -> Self
	where
		V: Coerce + 'static,
		F: Fn(&mut T, V) + Send + Sync + 'static,
	{
		let setter: ColumnSetter<T> = Arc::new(move |record: &mut T, raw: &str| {
			setter(record, V::coerce(raw)?);
			Ok(())
		});
		self.fields.push(DeclaredField {
			name,
			kind: FieldKind::Column(setter),
		});
		self
	}

	/// Declares a column field holding a nested object decoded from JSON text
	pub fn object<V, F>(mut self, name: &'static str, setter: F) -> Self
	where
		V: DeserializeOwned + 'static,
		F: Fn(&mut T, V) + Send + Sync + 'static,
	{
		let setter: ColumnSetter<T> = Arc::new(move |record: &mut T, raw: &str| {
			setter(record, coerce_object::<V>(raw)?);
			Ok(())
		});
		self.fields.push(DeclaredField {
			name,
			kind: FieldKind::Column(setter),
		});
		self
	}

	/// Declares a field injected into every record
	pub fn inject<V, F>(mut self, name: &'static str, marker: Inject, setter: F) -> Self
	where
		V: Any + Send + Sync,
		F: Fn(&mut T, Arc<V>) + Send + Sync + 'static,
	{
		let injector = Injector::Instance(Arc::new(
			move |record: &mut T, value: Arc<dyn Any + Send + Sync>| match value.downcast::<V>() {
				Ok(value) => {
					setter(record, value);
					true
				}
				Err(_) => false,
			},
		));
		self.fields.push(DeclaredField {
			name,
			kind: FieldKind::Inject {
				marker,
				value_type: TypeTag::of::<V>(),
				injector,
			},
		});
		self
	}

	/// Declares a type-level field injected once
	pub fn inject_static<V, F>(mut self, name: &'static str, marker: Inject, setter: F) -> Self
	where
		V: Any + Send + Sync,
		F: Fn(Arc<V>) + Send + Sync + 'static,
	{
		let injector = Injector::Static(Arc::new(
			move |value: Arc<dyn Any + Send + Sync>| match value.downcast::<V>() {
				Ok(value) => {
					setter(value);
					true
				}
				Err(_) => false,
			},
		));
		self.fields.push(DeclaredField {
			name,
			kind: FieldKind::Inject {
				marker,
				value_type: TypeTag::of::<V>(),
				injector,
			},
		});
		self
	}
}

impl<T> Schema<T> {
	pub fn fields(&self) -> &[DeclaredField<T>] {
		&self.fields
	}

	pub fn field_named(&self, name: &str) -> Option<&DeclaredField<T>> {
		self.fields.iter().find(|field| field.name == name)
	}

	/// Returns the setter of the column field called `name`
	pub fn column(&self, name: &str) -> Option<&ColumnSetter<T>> {
		self.field_named(name).and_then(DeclaredField::column)
	}
}

impl<T: 'static> Default for Schema<T> {
	fn default() -> Self {
		Self::new()
	}
}
