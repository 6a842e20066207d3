//! Test helper utilities for sheets and workbooks
//!
//! - `SheetBuilder`: Builder for creating test Sheet instances row by row
//! - `WorkbookBuilder`: Builder for creating test Workbook instances

use crate::services::decoder::{Sheet, Workbook, ROW_END, ROW_SERVER};

/// Builder for creating test Sheet instances
#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
	name: String,
	rows: Vec<Vec<String>>,
}

impl SheetBuilder {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			rows: Vec::new(),
		}
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

	pub fn build(self) -> Sheet {
		Sheet::new(self.name, self.rows)
	}
}

/// Builder for creating test Workbook instances
#[derive(Debug, Clone, Default)]
pub struct WorkbookBuilder {
	sheets: Vec<Sheet>,
}

impl WorkbookBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sheet(mut self, sheet: SheetBuilder) -> Self {
		self.sheets.push(sheet.build());
		self
	}

	pub fn build(self) -> Workbook {
		Workbook::new(self.sheets)
	}
}
