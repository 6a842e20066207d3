use crate::properties::strategies::{unique_citizens_strategy, Citizen};

use proptest::{prelude::*, test_runner::Config};
use static_storage::{
	models::{Definition, FormatProfile},
	repositories::StorageManager,
	services::{context::BeanContext, locator::MemoryLocator},
};
use std::sync::Arc;

fn load(citizens: &[Citizen]) -> StorageManager {
	let source = serde_json::to_vec(citizens).unwrap();
	let locator = MemoryLocator::new().with("json/Citizen.json", source);
	let manager = StorageManager::new(Arc::new(locator), Arc::new(BeanContext::new()));
	manager
		.define(Definition::<Citizen>::new(&FormatProfile::new("json", "json", "json")).unwrap())
		.unwrap();
	manager
}

fn runtime() -> tokio::runtime::Runtime {
	tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.unwrap()
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	// Query Operations Tests
	#[test]
	fn test_get_by_key(citizens in unique_citizens_strategy()) {
		let manager = load(&citizens);

		runtime().block_on(async {
			for citizen in &citizens {
				let stored = manager.get::<Citizen>(&citizen.id).await.unwrap();
				prop_assert_eq!(stored.as_deref(), Some(citizen));
			}
			Ok(())
		})?;
	}

	// get_all keeps source order
	#[test]
	fn test_get_all_order(citizens in unique_citizens_strategy()) {
		let manager = load(&citizens);

		let all = runtime().block_on(manager.get_all::<Citizen>()).unwrap();
		let all: Vec<Citizen> = all.iter().map(|c| c.as_ref().clone()).collect();
		prop_assert_eq!(all, citizens);
	}

	// Keys absent from the source are not found
	#[test]
	fn test_missing_key(citizens in unique_citizens_strategy(), absent in any::<i32>()) {
		prop_assume!(citizens.iter().all(|c| c.id != absent));
		let manager = load(&citizens);

		let found = runtime().block_on(manager.get::<Citizen>(&absent)).unwrap();
		prop_assert!(found.is_none());
	}
}
