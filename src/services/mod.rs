//! Services used while loading resources.
//!
//! - `decoder`: Format-polymorphic readers and the coercion engine
//! - `locator`: Resolution of location strings into raw bytes
//! - `context`: Resolution of values for injected fields

pub mod context;
pub mod decoder;
pub mod locator;
