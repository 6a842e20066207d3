//! Byte-stream resolution.
//!
//! A [`ResourceLocator`] turns the location string of a definition into the raw
//! bytes of the source. The storage layer treats the bytes as opaque.

mod error;

pub use error::LocatorError;

use async_trait::async_trait;
use dashmap::DashMap;
use std::{
	collections::HashMap,
	io::ErrorKind,
	path::{Path, PathBuf},
};

/// Resolves a location string into raw bytes
#[async_trait]
pub trait ResourceLocator: Send + Sync {
	async fn open(&self, location: &str) -> Result<Vec<u8>, LocatorError>;
}

/// Reads locations as paths relative to a base directory
#[derive(Debug, Clone)]
pub struct FileSystemLocator {
	base: PathBuf,
}

impl FileSystemLocator {
	pub fn new(base: impl Into<PathBuf>) -> Self {
		Self { base: base.into() }
	}

	pub fn base(&self) -> &Path {
		&self.base
	}
}

#[async_trait]
impl ResourceLocator for FileSystemLocator {
	async fn open(&self, location: &str) -> Result<Vec<u8>, LocatorError> {
		let path = self.base.join(location);
		tokio::fs::read(&path).await.map_err(|e| {
			let metadata = Some(HashMap::from([
				("location".to_string(), location.to_string()),
				("path".to_string(), path.display().to_string()),
			]));
			if e.kind() == ErrorKind::NotFound {
				LocatorError::not_found("resource file not found", Some(Box::new(e)), metadata)
			} else {
				LocatorError::io_error(
					format!("failed to read resource file: {}", e),
					Some(Box::new(e)),
					metadata,
				)
			}
		})
	}
}

/// Serves locations from memory, for embedded resources and tests
#[derive(Debug, Default)]
pub struct MemoryLocator {
	entries: DashMap<String, Vec<u8>>,
}

impl MemoryLocator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
		self.entries.insert(location.into(), bytes.into());
	}

	pub fn with(self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
		self.insert(location, bytes);
		self
	}
}

#[async_trait]
impl ResourceLocator for MemoryLocator {
	async fn open(&self, location: &str) -> Result<Vec<u8>, LocatorError> {
		self.entries
			.get(location)
			.map(|entry| entry.value().clone())
			.ok_or_else(|| {
				LocatorError::not_found(
					"no in-memory resource at location",
					None,
					Some(HashMap::from([(
						"location".to_string(),
						location.to_string(),
					)])),
				)
			})
	}
}
