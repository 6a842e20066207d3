use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use static_storage::models::{Resource, Schema};
use std::collections::HashMap;

const MIN_COLLECTION_SIZE: usize = 0;
const MAX_COLLECTION_SIZE: usize = 10;

/// Resource type used by every property test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citizen {
	pub id: i32,
	pub name: String,
	pub age: u8,
	pub tags: Vec<i32>,
}

impl Resource for Citizen {
	type Key = i32;
	const NAME: &'static str = "Citizen";

	fn key(&self) -> i32 {
		self.id
	}

	fn schema() -> Schema<Self> {
		Schema::new()
			.field("id", |c: &mut Citizen, v: i32| c.id = v)
			.field("name", |c: &mut Citizen, v: String| c.name = v)
			.field("age", |c: &mut Citizen, v: u8| c.age = v)
			.field("tags", |c: &mut Citizen, v: Vec<i32>| c.tags = v)
	}
}

impl Citizen {
	/// Cell texts in header order: id, name, age, tags
	pub fn cells(&self) -> Vec<String> {
		vec![
			self.id.to_string(),
			self.name.clone(),
			self.age.to_string(),
			serde_json::to_string(&self.tags).unwrap_or_default(),
		]
	}
}

pub fn citizen_strategy() -> impl Strategy<Value = Citizen> {
	(
		any::<i32>(),
		"[a-zA-Z][a-zA-Z0-9 ]{0,10}".prop_map(|s| s.to_string()),
		any::<u8>(),
		prop::collection::vec(any::<i32>(), MIN_COLLECTION_SIZE..MAX_COLLECTION_SIZE),
	)
		.prop_map(|(id, name, age, tags)| Citizen {
			id,
			name,
			age,
			tags,
		})
}

/// Citizens with distinct ids, in arbitrary order
pub fn unique_citizens_strategy() -> impl Strategy<Value = Vec<Citizen>> {
	prop::collection::hash_map(any::<i32>(), citizen_strategy(), 1..MAX_COLLECTION_SIZE).prop_map(
		|citizens: HashMap<i32, Citizen>| {
			citizens
				.into_iter()
				.map(|(id, citizen)| Citizen { id, ..citizen })
				.collect()
		},
	)
}
