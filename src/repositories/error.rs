//! Error types for storage operations.
//!
//! Every constructor logs the error through `tracing` when it is created, so
//! failures are reported once, at the layer that decides they are fatal.

use crate::{
	models::ConfigError,
	services::{decoder::DecodeError, locator::LocatorError},
	utils::logging::error::{ErrorContext, TraceableError},
};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur while registering, loading or querying storages
#[derive(ThisError, Debug)]
pub enum RepositoryError {
	/// Duplicate or missing registration, missing format profile, failed injection
	#[error("Configuration error: {0}")]
	ConfigurationError(ErrorContext),

	/// Access to a resource type that was never registered
	#[error("Illegal state: {0}")]
	IllegalState(ErrorContext),

	/// The source of a resource type could not be decoded
	#[error("Decode error: {0}")]
	DecodeError(ErrorContext),

	/// The source of a resource type or an export target could not be accessed
	#[error("IO error: {0}")]
	IoError(ErrorContext),

	/// Errors related to internal errors
	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl RepositoryError {
	// Configuration error
	pub fn configuration_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConfigurationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Illegal state
	pub fn illegal_state(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::IllegalState(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Decode error
	pub fn decode_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::DecodeError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// IO error
	pub fn io_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::IoError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Internal error
	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}

	/// Returns the error context, if the variant carries one
	pub fn context(&self) -> Option<&ErrorContext> {
		match self {
			Self::ConfigurationError(ctx)
			| Self::IllegalState(ctx)
			| Self::DecodeError(ctx)
			| Self::IoError(ctx)
			| Self::InternalError(ctx) => Some(ctx),
			Self::Other(_) => None,
		}
	}
}

impl TraceableError for RepositoryError {
	fn trace_id(&self) -> String {
		match self.context() {
			Some(ctx) => ctx.trace_id.clone(),
			None => Uuid::new_v4().to_string(),
		}
	}
}

impl From<ConfigError> for RepositoryError {
	fn from(err: ConfigError) -> Self {
		Self::configuration_error(err.to_string(), Some(Box::new(err)), None)
	}
}

impl From<DecodeError> for RepositoryError {
	fn from(err: DecodeError) -> Self {
		Self::decode_error(err.to_string(), Some(Box::new(err)), None)
	}
}

impl From<LocatorError> for RepositoryError {
	fn from(err: LocatorError) -> Self {
		Self::io_error(err.to_string(), Some(Box::new(err)), None)
	}
}
