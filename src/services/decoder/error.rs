//! Decoding error types.
//!
//! Errors raised while turning raw bytes into records. They are not logged here;
//! the repository layer logs them with the context of the resource being loaded.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur while decoding a resource source
#[derive(ThisError, Debug)]
pub enum DecodeError {
	/// The input is not a readable document of the expected format
	#[error("Malformed content: {0}")]
	MalformedContent(ErrorContext),

	/// A header names a field the resource type does not declare
	#[error("Unknown field: {0}")]
	UnknownField(ErrorContext),

	/// A sheet has no `SERVER` header row
	#[error("Missing header: {0}")]
	MissingHeader(ErrorContext),

	/// Cell text could not be coerced into the declared field type
	#[error("Conversion error: {0}")]
	ConversionError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl DecodeError {
	// Malformed content
	pub fn malformed_content(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::MalformedContent(ErrorContext::new(msg, source, metadata))
	}

	// Unknown field
	pub fn unknown_field(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UnknownField(ErrorContext::new(msg, source, metadata))
	}

	// Missing header
	pub fn missing_header(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::MissingHeader(ErrorContext::new(msg, source, metadata))
	}

	// Conversion error
	pub fn conversion_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConversionError(ErrorContext::new(msg, source, metadata))
	}

	/// Returns the context of this error, if it carries one
	pub fn context(&self) -> Option<&ErrorContext> {
		match self {
			Self::MalformedContent(ctx)
			| Self::UnknownField(ctx)
			| Self::MissingHeader(ctx)
			| Self::ConversionError(ctx) => Some(ctx),
			Self::Other(_) => None,
		}
	}
}

impl TraceableError for DecodeError {
	fn trace_id(&self) -> String {
		match self.context() {
			Some(ctx) => ctx.trace_id.clone(),
			None => Uuid::new_v4().to_string(),
		}
	}
}
