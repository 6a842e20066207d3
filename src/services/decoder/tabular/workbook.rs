//! In-memory workbook model.
//!
//! Every cell is held as text, addressed by absolute (row, column) position.
//! Spreadsheet files are opened with `calamine`; CSV input becomes a single sheet.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::{collections::HashMap, io::Cursor};

use crate::services::decoder::DecodeError;

/// Name given to the single sheet of a CSV workbook
pub const CSV_SHEET_NAME: &str = "Sheet1";

/// One sheet of text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
	name: String,
	rows: Vec<Vec<String>>,
}

impl Sheet {
	pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
		Self {
			name: name.into(),
			rows,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn rows(&self) -> &[Vec<String>] {
		&self.rows
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Returns the text of a cell, `None` when the cell does not exist
	pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
		self.rows
			.get(row)
			.and_then(|cells| cells.get(col))
			.map(String::as_str)
	}

	fn from_range(name: String, range: &Range<Data>) -> Self {
		let rows = match range.end() {
			Some((end_row, end_col)) => (0..=end_row)
				.map(|row| {
					(0..=end_col)
						.map(|col| {
							range
								.get_value((row, col))
								.map(cell_text)
								.unwrap_or_default()
						})
						.collect()
				})
				.collect(),
			None => Vec::new(),
		};
		Self { name, rows }
	}
}

fn cell_text(data: &Data) -> String {
	match data {
		Data::Empty => String::new(),
		Data::String(text) => text.clone(),
		other => other.to_string(),
	}
}

/// An ordered collection of sheets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
	sheets: Vec<Sheet>,
}

impl Workbook {
	pub fn new(sheets: Vec<Sheet>) -> Self {
		Self { sheets }
	}

	pub fn sheets(&self) -> &[Sheet] {
		&self.sheets
	}

	pub fn sheet(&self, name: &str) -> Option<&Sheet> {
		self.sheets.iter().find(|sheet| sheet.name == name)
	}

	/// Opens spreadsheet bytes (xlsx, xlsm, xlsb, xls or ods, detected from content)
	pub fn from_spreadsheet(input: &[u8], resource: &str) -> Result<Self, DecodeError> {
		let mut workbook = open_workbook_auto_from_rs(Cursor::new(input)).map_err(|e| {
			DecodeError::malformed_content(
				format!("failed to open workbook: {}", e),
				Some(Box::new(e)),
				Some(HashMap::from([(
					"resource".to_string(),
					resource.to_string(),
				)])),
			)
		})?;

		let sheets = workbook
			.worksheets()
			.into_iter()
			.map(|(name, range)| Sheet::from_range(name, &range))
			.collect();
		Ok(Self { sheets })
	}

	/// Reads CSV bytes into a single sheet, without treating any row as a header
	pub fn from_csv(input: &[u8], resource: &str) -> Result<Self, DecodeError> {
		let mut reader = csv::ReaderBuilder::new()
			.has_headers(false)
			.flexible(true)
			.from_reader(input);

		let mut rows = Vec::new();
		for (line, record) in reader.records().enumerate() {
			let record = record.map_err(|e| {
				DecodeError::malformed_content(
					format!("failed to read CSV record: {}", e),
					Some(Box::new(e)),
					Some(HashMap::from([
						("resource".to_string(), resource.to_string()),
						("row".to_string(), line.to_string()),
					])),
				)
			})?;
			rows.push(record.iter().map(str::to_string).collect());
		}

		Ok(Self {
			sheets: vec![Sheet::new(CSV_SHEET_NAME, rows)],
		})
	}
}
