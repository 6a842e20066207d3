//! Test helper utilities
//!
//! - `builders`: Builders for sheets, workbooks and CSV sources used by unit and
//!   integration tests

pub mod builders {
	mod csv_source;
	mod sheet;

	pub use csv_source::CsvBuilder;
	pub use sheet::{SheetBuilder, WorkbookBuilder};
}

pub use builders::*;
