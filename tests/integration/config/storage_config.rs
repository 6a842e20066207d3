use std::{io::Write, sync::Arc};
use tempfile::NamedTempFile;

use static_storage::{
	models::{ConfigError, ConfigLoader, StorageConfig},
	repositories::StorageManagerFactory,
};

use crate::integration::fixtures::{context, fixture_dir, Human};

fn write_config(content: &str) -> NamedTempFile {
	let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
	file.write_all(content.as_bytes()).unwrap();
	file
}

#[tokio::test]
async fn test_load_config_and_build_from_it() {
	let content = format!(
		r#"{{
			"resource_dir": {:?},
			"formats": {{
				"excel": {{ "format": "excel", "location": "resources", "suffix": "xlsx" }},
				"json": {{ "format": "json", "location": "json", "suffix": "json" }}
			}}
		}}"#,
		fixture_dir().display().to_string()
	);
	let file = write_config(&content);

	let config = StorageConfig::load_from_path(file.path()).await.unwrap();
	assert_eq!(config.formats.len(), 2);
	assert_eq!(config.format("excel").map(|p| p.suffix.as_str()), Some("xlsx"));

	let manager = StorageManagerFactory::from_config(config, Arc::new(context()))
		.with_resource::<Human>("excel")
		.unwrap()
		.build()
		.await
		.unwrap();

	let ann = manager.get::<Human>(&1).await.unwrap().unwrap();
	assert_eq!(ann.name, "Ann");
	assert_eq!(manager.get_all::<Human>().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_load_rejects_unknown_format() {
	let file = write_config(
		r#"{
			"resource_dir": "data",
			"formats": { "yaml": { "format": "yaml", "location": "yaml", "suffix": "yml" } }
		}"#,
	);

	let err = StorageConfig::load_from_path(file.path()).await.unwrap_err();
	match err {
		ConfigError::ValidationError(ctx) => {
			assert!(ctx.message.contains("csv, excel, json"));
			assert_eq!(ctx.metadata_value("profile"), Some("yaml"));
		}
		other => panic!("expected ValidationError, got {:?}", other),
	}
}

#[tokio::test]
async fn test_load_rejects_unknown_keys() {
	let file = write_config(
		r#"{ "resource_dir": "data", "formats": {}, "watch": true }"#,
	);

	assert!(matches!(
		StorageConfig::load_from_path(file.path()).await,
		Err(ConfigError::ParseError(_))
	));
}

#[tokio::test]
async fn test_load_rejects_non_json_path() {
	let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();

	assert!(matches!(
		StorageConfig::load_from_path(file.path()).await,
		Err(ConfigError::FileError(_))
	));
}
