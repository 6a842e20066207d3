use crate::properties::strategies::{citizen_strategy, Citizen};

use proptest::{prelude::*, test_runner::Config};
use static_storage::{
	models::Resource,
	services::decoder::{ResourceReader, TabularReader},
	utils::tests::builders::{CsvBuilder, SheetBuilder, WorkbookBuilder},
};

const HEADER: [&str; 4] = ["id", "name", "age", "tags"];
const MAX_ROWS: usize = 12;

fn cells(citizen: &Citizen) -> Vec<String> {
	citizen.cells()
}

fn as_refs(cells: &[String]) -> Vec<&str> {
	cells.iter().map(String::as_str).collect()
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	// One record per data row, in row order
	#[test]
	fn test_one_record_per_row(
		citizens in prop::collection::vec(citizen_strategy(), 0..MAX_ROWS)
	) {
		let mut sheet = SheetBuilder::new("Citizen").header(&HEADER);
		for citizen in &citizens {
			sheet = sheet.data(&as_refs(&cells(citizen)));
		}
		let workbook = WorkbookBuilder::new().sheet(sheet).build();

		let decoded: Vec<Citizen> = TabularReader::excel()
			.read_workbook(&workbook, &Citizen::schema())
			.unwrap();
		prop_assert_eq!(decoded, citizens);
	}

	// Rows after the END row are ignored
	#[test]
	fn test_end_row_truncates(
		citizens in prop::collection::vec(citizen_strategy(), 1..MAX_ROWS),
		trailing in prop::collection::vec(citizen_strategy(), 0..MAX_ROWS),
		split in any::<prop::sample::Index>(),
	) {
		let last = split.index(citizens.len());

		let mut source = CsvBuilder::new().row(&["Citizen"]).header(&HEADER);
		for (position, citizen) in citizens.iter().enumerate() {
			let row = cells(citizen);
			source = if position == last {
				source.end(&as_refs(&row))
			} else {
				source.data(&as_refs(&row))
			};
		}
		for citizen in &trailing {
			source = source.data(&as_refs(&cells(citizen)));
		}

		let decoded: Vec<Citizen> = TabularReader::csv()
			.read(&source.build(), &Citizen::schema())
			.unwrap();
		prop_assert_eq!(decoded.as_slice(), &citizens[..=last]);
	}
}
