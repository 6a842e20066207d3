use proptest::{prelude::*, test_runner::Config};
use static_storage::services::decoder::{Coerce, CoerceError};
use std::collections::HashMap;

const MAX_ENTRIES: usize = 10;

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	// Scalars parse back from their own text
	#[test]
	fn test_integer_roundtrip(value in any::<i64>(), small in any::<u8>()) {
		prop_assert_eq!(i64::coerce(&value.to_string()).unwrap(), value);
		prop_assert_eq!(u8::coerce(&small.to_string()).unwrap(), small);
		prop_assert_eq!(Option::<i64>::coerce(&value.to_string()).unwrap(), Some(value));
	}

	#[test]
	fn test_bool_ignores_case(value in any::<bool>(), upper in any::<bool>()) {
		let text = if upper { value.to_string().to_uppercase() } else { value.to_string() };
		prop_assert_eq!(bool::coerce(&text).unwrap(), value);
	}

	#[test]
	fn test_non_numeric_text_fails(text in "[a-zA-Z_]{1,8}") {
		let signed = i32::coerce(&text);
		prop_assert!(matches!(signed, Err(CoerceError::Invalid { .. })), "unexpected {:?}", signed);
		let unsigned = u64::coerce(&text);
		prop_assert!(
			matches!(unsigned, Err(CoerceError::Invalid { .. })),
			"unexpected {:?}",
			unsigned
		);
	}

	// Collections decode from their JSON text
	#[test]
	fn test_list_from_json(values in prop::collection::vec(any::<i32>(), 0..MAX_ENTRIES)) {
		let text = serde_json::to_string(&values).unwrap();
		prop_assert_eq!(Vec::<i32>::coerce(&text).unwrap(), values);
	}

	#[test]
	fn test_map_from_json(
		entries in prop::collection::hash_map(any::<i32>(), "[a-z]{0,8}", 0..MAX_ENTRIES)
	) {
		let text = serde_json::to_string(&entries).unwrap();
		prop_assert_eq!(HashMap::<i32, String>::coerce(&text).unwrap(), entries);
	}

	// Text that is neither an array nor an object has no collection rule
	#[test]
	fn test_collections_need_json_shape(text in "[a-z0-9 ]{1,10}") {
		let list = Vec::<i32>::coerce(&text);
		prop_assert!(matches!(list, Err(CoerceError::NoRule { .. })), "unexpected {:?}", list);
		let map = HashMap::<i32, String>::coerce(&text);
		prop_assert!(matches!(map, Err(CoerceError::NoRule { .. })), "unexpected {:?}", map);
	}
}
