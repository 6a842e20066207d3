//! Static resource storage.
//!
//! This library turns declaratively described resource types plus external data files
//! (spreadsheets, CSV sheets, JSON arrays) into typed, read-only repositories that
//! business logic queries at runtime. It includes:
//!
//! - Resource definitions built once per type from a static field schema
//! - Format-polymorphic decoding with text-to-typed-value coercion
//! - Concurrent, all-or-nothing bulk loading of every configured resource
//! - A storage manager holding exactly one repository per resource type
//!
//! # Module Structure
//!
//! - `models`: Resource trait, schemas, definitions and configuration
//! - `repositories`: Per-type storages, the storage manager and bulk loading
//! - `services`: Decoding pipeline, byte-stream location and injection context
//! - `utils`: Logging, error context and test helpers

pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
