//! Tabular resource reader.
//!
//! Sheets follow a fixed layout: rows before the header row are free-form comments,
//! the header row has `SERVER` in its first column and field names in the following
//! columns, and data rows run up to and including the row whose first column is
//! `END`. The first column of data rows is reserved for these control markers.

mod workbook;

pub use workbook::{Sheet, Workbook, CSV_SHEET_NAME};

use std::collections::HashMap;
use tracing::debug;

use crate::{
	models::{ColumnSetter, Resource, Schema},
	services::decoder::{DecodeError, ResourceReader},
};

/// Marks the header row and the start of data
pub const ROW_SERVER: &str = "SERVER";
/// Marks the last data row
pub const ROW_END: &str = "END";

/// How the tabular input bytes are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
	/// Spreadsheet files opened with calamine
	Excel,
	/// Comma separated values, one sheet
	Csv,
}

/// Reads records from the sheets of a workbook
#[derive(Debug, Clone, Copy)]
pub struct TabularReader {
	format: TabularFormat,
}

struct ColumnInfo<'a, T> {
	index: usize,
	field: &'static str,
	setter: &'a ColumnSetter<T>,
}

impl TabularReader {
	pub fn new(format: TabularFormat) -> Self {
		Self { format }
	}

	pub fn excel() -> Self {
		Self::new(TabularFormat::Excel)
	}

	pub fn csv() -> Self {
		Self::new(TabularFormat::Csv)
	}

	/// Reads records of `T` from an already opened workbook
	pub fn read_workbook<T: Resource>(
		&self,
		workbook: &Workbook,
		schema: &Schema<T>,
	) -> Result<Vec<T>, DecodeError> {
		let mut result = Vec::new();

		for sheet in select_sheets(workbook, T::NAME)? {
			let before = result.len();
			read_sheet(sheet, schema, &mut result)?;
			debug!(
				resource = T::NAME,
				sheet = sheet.name(),
				records = result.len() - before,
				"read sheet"
			);
		}

		Ok(result)
	}
}

impl ResourceReader for TabularReader {
	fn format(&self) -> &'static str {
		match self.format {
			TabularFormat::Excel => "excel",
			TabularFormat::Csv => "csv",
		}
	}

	fn read<T: Resource>(&self, input: &[u8], schema: &Schema<T>) -> Result<Vec<T>, DecodeError> {
		let workbook = match self.format {
			TabularFormat::Excel => Workbook::from_spreadsheet(input, T::NAME)?,
			TabularFormat::Csv => Workbook::from_csv(input, T::NAME)?,
		};
		self.read_workbook(&workbook, schema)
	}
}

/// Selects the sheets holding records of the resource called `name`.
///
/// Every non-empty sheet whose first cell is the resource name is merged in workbook
/// order. Otherwise the sheet named after the resource is used, then the first sheet.
fn select_sheets<'a>(workbook: &'a Workbook, name: &str) -> Result<Vec<&'a Sheet>, DecodeError> {
	let titled: Vec<&Sheet> = workbook
		.sheets()
		.iter()
		.filter(|sheet| !sheet.is_empty() && sheet.cell(0, 0) == Some(name))
		.collect();
	if !titled.is_empty() {
		return Ok(titled);
	}

	workbook
		.sheet(name)
		.or_else(|| workbook.sheets().first())
		.map(|sheet| vec![sheet])
		.ok_or_else(|| {
			DecodeError::malformed_content(
				"workbook has no sheets",
				None,
				Some(HashMap::from([("resource".to_string(), name.to_string())])),
			)
		})
}

fn header_row(sheet: &Sheet) -> Option<usize> {
	sheet
		.rows()
		.iter()
		.position(|row| row.first().map(String::as_str) == Some(ROW_SERVER))
}

fn columns<'a, T: Resource>(
	sheet: &Sheet,
	header: usize,
	schema: &'a Schema<T>,
) -> Result<Vec<ColumnInfo<'a, T>>, DecodeError> {
	let mut result = Vec::new();
	for (index, name) in sheet.rows()[header].iter().enumerate().skip(1) {
		if name.is_empty() {
			continue;
		}

		let (field, setter) = schema
			.field_named(name)
			.and_then(|field| field.column().map(|setter| (field.name(), setter)))
			.ok_or_else(|| {
				DecodeError::unknown_field(
					format!("resource {} declares no column field {:?}", T::NAME, name),
					None,
					Some(HashMap::from([
						("resource".to_string(), T::NAME.to_string()),
						("sheet".to_string(), sheet.name().to_string()),
						("field".to_string(), name.to_string()),
						("column".to_string(), index.to_string()),
					])),
				)
			})?;
		result.push(ColumnInfo {
			index,
			field,
			setter,
		});
	}
	Ok(result)
}

fn read_sheet<T: Resource>(
	sheet: &Sheet,
	schema: &Schema<T>,
	result: &mut Vec<T>,
) -> Result<(), DecodeError> {
	let header = header_row(sheet).ok_or_else(|| {
		DecodeError::missing_header(
			format!("sheet has no {} header row", ROW_SERVER),
			None,
			Some(HashMap::from([
				("resource".to_string(), T::NAME.to_string()),
				("sheet".to_string(), sheet.name().to_string()),
			])),
		)
	})?;
	let columns = columns(sheet, header, schema)?;

	for (offset, row) in sheet.rows()[header + 1..].iter().enumerate() {
		let mut record = T::default();
		for column in &columns {
			let Some(text) = row.get(column.index).filter(|text| !text.is_empty()) else {
				continue;
			};
			(column.setter)(&mut record, text.as_str()).map_err(|e| {
				DecodeError::conversion_error(
					format!(
						"failed to convert {:?} into {}.{}",
						text,
						T::NAME,
						column.field
					),
					Some(Box::new(e)),
					Some(HashMap::from([
						("resource".to_string(), T::NAME.to_string()),
						("field".to_string(), column.field.to_string()),
						("raw".to_string(), text.clone()),
						("sheet".to_string(), sheet.name().to_string()),
						("row".to_string(), (header + 1 + offset).to_string()),
					])),
				)
			})?;
		}
		result.push(record);

		if row.first().map(String::as_str) == Some(ROW_END) {
			break;
		}
	}
	Ok(())
}
