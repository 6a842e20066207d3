//! Configuration error types.
//!
//! Raised while loading the storage configuration file and while building
//! definitions out of its format profiles.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur while loading configuration or building definitions
#[derive(ThisError, Debug)]
pub enum ConfigError {
	/// A value is missing, blank or unsupported
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// The configuration file is not valid JSON for the expected shape
	#[error("Parse error: {0}")]
	ParseError(ErrorContext),

	/// The configuration file could not be read
	#[error("File error: {0}")]
	FileError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl ConfigError {
	// Validation error
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new(msg, source, metadata))
	}

	// Parse error
	pub fn parse_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ParseError(ErrorContext::new(msg, source, metadata))
	}

	// File error
	pub fn file_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::FileError(ErrorContext::new(msg, source, metadata))
	}

	/// Returns the error context, if the variant carries one
	pub fn context(&self) -> Option<&ErrorContext> {
		match self {
			Self::ValidationError(ctx) | Self::ParseError(ctx) | Self::FileError(ctx) => Some(ctx),
			Self::Other(_) => None,
		}
	}
}

impl TraceableError for ConfigError {
	fn trace_id(&self) -> String {
		match self.context() {
			Some(ctx) => ctx.trace_id.clone(),
			None => Uuid::new_v4().to_string(),
		}
	}
}

impl From<std::io::Error> for ConfigError {
	fn from(err: std::io::Error) -> Self {
		Self::file_error(err.to_string(), Some(Box::new(err)), None)
	}
}

impl From<serde_json::Error> for ConfigError {
	fn from(err: serde_json::Error) -> Self {
		Self::parse_error(err.to_string(), Some(Box::new(err)), None)
	}
}
