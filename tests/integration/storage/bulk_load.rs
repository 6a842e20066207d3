use async_trait::async_trait;
use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};
use tokio::sync::Barrier;

use static_storage::{
	models::{Definition, StorageConfig},
	repositories::{RepositoryError, StorageManagerFactory},
	services::locator::{LocatorError, MemoryLocator, ResourceLocator},
	utils::tests::builders::CsvBuilder,
};

use crate::integration::fixtures::{
	context, csv, excel, fixture_dir, human_workbook, json, Human, Item, Pet, PETS,
};

fn items() -> Vec<u8> {
	CsvBuilder::new()
		.row(&["Item table"])
		.header(&["id", "name", "price", "stackable"])
		.data(&["1", "Potion", "25", "true"])
		.end(&["2", "Sword", "300", ""])
		.build()
}

fn sources() -> MemoryLocator {
	MemoryLocator::new()
		.with("json/Pet.json", PETS)
		.with("tables/Item.csv", items())
		.with("resources/Human.xlsx", human_workbook())
}

/// Releases every read only once all expected reads have started
struct BarrierLocator {
	inner: MemoryLocator,
	barrier: Barrier,
	reads: AtomicUsize,
}

#[async_trait]
impl ResourceLocator for BarrierLocator {
	async fn open(&self, location: &str) -> Result<Vec<u8>, LocatorError> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		self.barrier.wait().await;
		self.inner.open(location).await
	}
}

#[tokio::test]
async fn test_bulk_load_registers_every_type() {
	let manager = StorageManagerFactory::new(Arc::new(sources()), Arc::new(context()))
		.with_definition(Definition::<Pet>::new(&json()).unwrap())
		.with_definition(Definition::<Item>::new(&csv()).unwrap())
		.with_definition(Definition::<Human>::new(&excel()).unwrap())
		.build()
		.await
		.unwrap();

	assert_eq!(manager.list_storages().len(), 3);
	assert_eq!(manager.get_all::<Pet>().await.unwrap().len(), 2);
	assert_eq!(manager.get_all::<Human>().await.unwrap().len(), 3);

	let sword = manager.get::<Item>(&2).await.unwrap().unwrap();
	assert_eq!(sword.price, 300);
	assert_eq!(sword.stackable, None);
	assert_eq!(manager.get_from_cache("items").as_deref(), Some(&items()));
}

#[tokio::test]
async fn test_bulk_load_reads_sources_concurrently() {
	let locator = Arc::new(BarrierLocator {
		inner: sources(),
		barrier: Barrier::new(3),
		reads: AtomicUsize::new(0),
	});

	let build = StorageManagerFactory::new(locator.clone(), Arc::new(context()))
		.with_definition(Definition::<Pet>::new(&json()).unwrap())
		.with_definition(Definition::<Item>::new(&csv()).unwrap())
		.with_definition(Definition::<Human>::new(&excel()).unwrap())
		.build();

	let manager = tokio::time::timeout(Duration::from_secs(10), build)
		.await
		.expect("reads did not run concurrently")
		.unwrap();
	assert_eq!(locator.reads.load(Ordering::SeqCst), 3);
	assert_eq!(manager.list_storages().len(), 3);
}

#[tokio::test]
async fn test_single_decode_failure_aborts_bulk_load() {
	let broken_items = CsvBuilder::new()
		.header(&["id", "name", "price"])
		.data(&["1", "Potion", "25"])
		.end(&["2", "Sword", "abc"])
		.build();
	let locator = sources().with("tables/Item.csv", broken_items);

	let err = StorageManagerFactory::new(Arc::new(locator), Arc::new(context()))
		.with_definition(Definition::<Pet>::new(&json()).unwrap())
		.with_definition(Definition::<Item>::new(&csv()).unwrap())
		.with_definition(Definition::<Human>::new(&excel()).unwrap())
		.build()
		.await
		.err()
		.expect("bulk load should fail");

	let RepositoryError::DecodeError(ctx) = &err else {
		panic!("expected DecodeError, got {:?}", err);
	};
	assert_eq!(ctx.metadata_value("resource"), Some("Item"));
	assert!(err.to_string().contains("raw=abc"));
	assert!(err.to_string().contains("Item.price"));
}

#[tokio::test]
async fn test_missing_source_aborts_bulk_load() {
	let locator = MemoryLocator::new().with("json/Pet.json", PETS);

	let result = StorageManagerFactory::new(Arc::new(locator), Arc::new(context()))
		.with_definition(Definition::<Pet>::new(&json()).unwrap())
		.with_definition(Definition::<Item>::new(&csv()).unwrap())
		.build()
		.await;

	assert!(matches!(result, Err(RepositoryError::IoError(_))));
}

#[tokio::test]
async fn test_failed_injection_aborts_bulk_load() {
	let result = StorageManagerFactory::new(
		Arc::new(sources()),
		Arc::new(static_storage::services::context::BeanContext::new()),
	)
	.with_definition(Definition::<Human>::new(&excel()).unwrap())
	.build()
	.await;

	assert!(matches!(result, Err(RepositoryError::ConfigurationError(_))));
}

#[tokio::test]
async fn test_cached_bytes_replace_the_location() {
	let cached = CsvBuilder::new()
		.header(&["id", "name"])
		.end(&["7", "Shield"])
		.build();

	let manager = StorageManagerFactory::new(Arc::new(MemoryLocator::new()), Arc::new(context()))
		.with_cache("items", cached)
		.with_definition(Definition::<Item>::new(&csv()).unwrap())
		.build()
		.await
		.unwrap();

	assert_eq!(
		manager.get::<Item>(&7).await.unwrap().map(|i| i.name.clone()),
		Some("Shield".to_string())
	);
}

#[tokio::test]
async fn test_bulk_load_from_config() {
	let config = StorageConfig {
		resource_dir: fixture_dir(),
		export_dir: None,
		formats: HashMap::from([("excel".to_string(), excel())]),
	};

	let manager = StorageManagerFactory::from_config(config, Arc::new(context()))
		.with_resource::<Human>("excel")
		.unwrap()
		.build()
		.await
		.unwrap();

	let humans = manager.get_all::<Human>().await.unwrap();
	assert_eq!(
		humans.iter().map(|h| h.id).collect::<Vec<_>>(),
		vec![1, 2, 3]
	);
}
