//! Storage registries and their loading.
//!
//! A [`StorageManager`] owns one definition and at most one [`Storage`] per
//! resource type:
//!
//! - `manager`: Registration, lazy creation and queries
//! - `factory`: Concurrent bulk loading of many definitions
//! - `storage`: Per-type indexed records, swapped atomically on reload
//! - `loader`: Source fetching, decoding and injection shared by all storages
//! - `export`: JSON export of every storage

mod error;
mod export;
mod factory;
mod loader;
mod manager;
mod storage;

pub use error::RepositoryError;
pub use export::ExportReport;
pub use factory::StorageManagerFactory;
pub use loader::{Loader, Source};
pub use manager::StorageManager;
pub use storage::{AnyStorage, Storage};
