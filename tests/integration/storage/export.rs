use std::sync::Arc;
use tempfile::TempDir;
use tracing_test::traced_test;

use static_storage::{
	models::Definition,
	repositories::{RepositoryError, StorageManager},
	services::locator::MemoryLocator,
};

use crate::integration::fixtures::{context, json, Broken, Pet, PETS};

async fn manager() -> StorageManager {
	let locator = MemoryLocator::new()
		.with("json/Pet.json", PETS)
		.with("json/Broken.json", r#"[{"id": 1}]"#);
	let manager = StorageManager::new(Arc::new(locator), Arc::new(context()));
	manager
		.register(Definition::<Pet>::new(&json()).unwrap())
		.await
		.unwrap();
	manager
		.register(Definition::<Broken>::new(&json()).unwrap())
		.await
		.unwrap();
	manager
}

#[tokio::test]
#[traced_test]
async fn test_export_skips_failing_storage() {
	let manager = manager().await;
	let dir = TempDir::new().unwrap();

	let report = manager.write_json(dir.path()).await.unwrap();

	assert_eq!(report.written, vec![dir.path().join("Pet.json")]);
	assert_eq!(report.failed, vec!["Broken".to_string()]);
	assert!(!report.is_complete());
	assert!(!dir.path().join("Broken.json").exists());
	assert!(logs_contain("failed to serialize storage"));

	let exported: Vec<Pet> =
		serde_json::from_slice(&std::fs::read(dir.path().join("Pet.json")).unwrap()).unwrap();
	assert_eq!(
		exported.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
		vec!["Rex", "Tom"]
	);
}

#[tokio::test]
async fn test_export_creates_nested_directory() {
	let manager = manager().await;
	let dir = TempDir::new().unwrap();
	let target = dir.path().join("out").join("static");

	let report = manager.write_json(&target).await.unwrap();
	assert!(target.join("Pet.json").is_file());
	assert_eq!(report.written.len(), 1);
}

#[tokio::test]
async fn test_export_fails_when_directory_cannot_be_created() {
	let manager = manager().await;
	let dir = TempDir::new().unwrap();
	let file = dir.path().join("occupied");
	std::fs::write(&file, b"not a directory").unwrap();

	assert!(matches!(
		manager.write_json(&file.join("export")).await,
		Err(RepositoryError::IoError(_))
	));
}

#[tokio::test]
async fn test_export_of_empty_manager() {
	let manager = StorageManager::new(Arc::new(MemoryLocator::new()), Arc::new(context()));
	let dir = TempDir::new().unwrap();

	let report = manager.write_json(dir.path()).await.unwrap();
	assert!(report.written.is_empty());
	assert!(report.is_complete());
}
