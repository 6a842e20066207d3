//! JSON-array resource reader.

use std::collections::HashMap;

use crate::{
	models::{Resource, Schema},
	services::decoder::{DecodeError, ResourceReader},
};

/// Reads a whole input as one JSON array of records
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl ResourceReader for JsonReader {
	fn format(&self) -> &'static str {
		"json"
	}

	fn read<T: Resource>(&self, input: &[u8], _schema: &Schema<T>) -> Result<Vec<T>, DecodeError> {
		serde_json::from_slice::<Vec<T>>(input).map_err(|e| {
			DecodeError::malformed_content(
				format!("failed to parse JSON array: {}", e),
				Some(Box::new(e)),
				Some(HashMap::from([("resource".to_string(), T::NAME.to_string())])),
			)
		})
	}
}
