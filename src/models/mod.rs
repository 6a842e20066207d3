//! Domain models for static resource storage.
//!
//! - `resource`: The [`Resource`] trait implemented by every resource type
//! - `schema`: Statically declared field tables replacing runtime introspection
//! - `definition`: Immutable load plans built once per resource type
//! - `config`: Storage configuration loading and validation

mod config;
mod definition;
mod resource;
mod schema;

pub use config::{ConfigError, ConfigLoader, StorageConfig, ENV_EXPORT_DIR, ENV_RESOURCE_DIR};
pub use definition::{Definition, FormatProfile, InjectionSpec, ResolveKey};
pub use resource::{Resource, TypeTag};
pub use schema::{ColumnSetter, DeclaredField, FieldKind, Inject, Injector, Schema};
