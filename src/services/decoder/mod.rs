//! Resource decoding pipeline.
//!
//! Readers turn the raw bytes of a resource source into typed records. A reader is
//! selected by the format key of a definition through [`ReaderHolder`]:
//!
//! - `json`: the whole input is one JSON array of records
//! - `excel`: spreadsheet workbooks, one record per data row
//! - `csv`: a single CSV sheet with the same layout as spreadsheets

mod coerce;
mod error;
mod json;
mod tabular;

pub use coerce::{coerce_object, Coerce, CoerceError, MapKey};
pub use error::DecodeError;
pub use json::JsonReader;
pub use tabular::{
	Sheet, TabularFormat, TabularReader, Workbook, CSV_SHEET_NAME, ROW_END, ROW_SERVER,
};

use std::collections::HashMap;

use crate::models::{Resource, Schema};

/// Decodes raw bytes into ordered records of a resource type
pub trait ResourceReader: Send + Sync {
	/// Format key handled by this reader
	fn format(&self) -> &'static str;

	/// Reads every record of `T` from `input`, in source order.
	///
	/// `schema` is the field table built once for the definition of `T`.
	fn read<T: Resource>(&self, input: &[u8], schema: &Schema<T>) -> Result<Vec<T>, DecodeError>;
}

/// The built-in readers
#[derive(Debug, Clone, Copy)]
pub enum Reader {
	Json(JsonReader),
	Tabular(TabularReader),
}

impl ResourceReader for Reader {
	fn format(&self) -> &'static str {
		match self {
			Self::Json(reader) => reader.format(),
			Self::Tabular(reader) => reader.format(),
		}
	}

	fn read<T: Resource>(&self, input: &[u8], schema: &Schema<T>) -> Result<Vec<T>, DecodeError> {
		match self {
			Self::Json(reader) => reader.read(input, schema),
			Self::Tabular(reader) => reader.read(input, schema),
		}
	}
}

/// Readers indexed by format key
#[derive(Debug, Clone)]
pub struct ReaderHolder {
	readers: HashMap<&'static str, Reader>,
}

impl ReaderHolder {
	/// Creates a holder with the `json`, `excel` and `csv` readers
	pub fn new() -> Self {
		let mut holder = Self {
			readers: HashMap::new(),
		};
		holder.register(Reader::Json(JsonReader));
		holder.register(Reader::Tabular(TabularReader::excel()));
		holder.register(Reader::Tabular(TabularReader::csv()));
		holder
	}

	fn register(&mut self, reader: Reader) {
		self.readers.insert(reader.format(), reader);
	}

	pub fn get(&self, format: &str) -> Option<&Reader> {
		self.readers.get(format)
	}

	pub fn supports(&self, format: &str) -> bool {
		self.readers.contains_key(format)
	}

	/// Known format keys, sorted
	pub fn formats(&self) -> Vec<&'static str> {
		let mut formats: Vec<_> = self.readers.keys().copied().collect();
		formats.sort_unstable();
		formats
	}
}

impl Default for ReaderHolder {
	fn default() -> Self {
		Self::new()
	}
}
