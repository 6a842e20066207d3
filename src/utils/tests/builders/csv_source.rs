//! Test helper utilities for CSV sources
//!
//! - `CsvBuilder`: Builder for creating CSV bytes with the tabular layout

use crate::services::decoder::{ROW_END, ROW_SERVER};

/// Builder for creating CSV sources
#[derive(Debug, Clone, Default)]
pub struct CsvBuilder {
	rows: Vec<Vec<String>>,
}

impl CsvBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a row of cells
	pub fn row(mut self, cells: &[&str]) -> Self {
		self.rows.push(cells.iter().map(|c| c.to_string()).collect());
		self
	}

	/// Appends the header row naming `fields`
	pub fn header(self, fields: &[&str]) -> Self {
		let mut cells = vec![ROW_SERVER];
		cells.extend_from_slice(fields);
		self.row(&cells)
	}

	/// Appends a data row
	pub fn data(self, values: &[&str]) -> Self {
		let mut cells = vec![""];
		cells.extend_from_slice(values);
		self.row(&cells)
	}

	/// Appends the last data row
	pub fn end(self, values: &[&str]) -> Self {
		let mut cells = vec![ROW_END];
		cells.extend_from_slice(values);
		self.row(&cells)
	}

	/// Writes the rows as CSV, quoting cells where needed
	pub fn build(self) -> Vec<u8> {
		let mut writer = csv::WriterBuilder::new()
			.flexible(true)
			.from_writer(Vec::new());
		for row in &self.rows {
			writer
				.write_record(row)
				.expect("writing to a Vec cannot fail");
		}
		writer.into_inner().expect("writing to a Vec cannot fail")
	}
}
