use modelmgmt_engine::{ClassProvider, DefinitionProvider, EngineError, ManagerConfig, MemoryChangeLog, ModelManager};
use modelmgmt_server::SeedProvider;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const SEED: &str = r#"{
  "classes": [
    {"id": "emf:Entity", "labels": {"en": "Entity"}},
    {"id": "emf:Case", "parentId": "emf:Entity"}
  ],
  "definitions": [
    {
      "id": "PR0001",
      "rdfType": "emf:Case",
      "labels": {"en": "Project"},
      "fields": [{"id": "title", "regionId": "details"}],
      "regions": [{"id": "details"}]
    }
  ]
}"#;

// ── Reading ──────────────────────────────────────────────────────

#[tokio::test]
async fn seed_file_feeds_both_providers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.json");
    std::fs::write(&path, SEED).unwrap();

    let provider = SeedProvider::new(&path);
    let classes = provider.list_classes().await.unwrap();
    let definitions = provider.list_definitions().await.unwrap();

    assert_eq!(classes.len(), 2);
    assert_eq!(classes[1].parent_id.as_deref(), Some("emf:Entity"));
    assert_eq!(definitions[0].id, "PR0001");
    assert_eq!(
        definitions[0].fields.get("title").unwrap().region_id.as_deref(),
        Some("details")
    );
}

#[tokio::test]
async fn manager_loads_from_seed_and_reloads_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.json");
    std::fs::write(&path, SEED).unwrap();

    let provider = Arc::new(SeedProvider::new(&path));
    let manager = ModelManager::load(
        ManagerConfig::default(),
        provider.clone(),
        provider,
        Arc::new(MemoryChangeLog::new()),
    )
    .await
    .unwrap();
    assert_eq!(manager.hierarchy()[1].sub_types.len(), 1);

    let edited = json!({
        "classes": [{"id": "emf:Entity"}],
        "definitions": [{"id": "PR0002"}]
    });
    std::fs::write(&path, edited.to_string()).unwrap();
    manager.reload().await.unwrap();

    assert!(manager.models().definition("PR0002").is_some());
    assert!(manager.models().definition("PR0001").is_none());
}

#[tokio::test]
async fn empty_provider_serves_nothing() {
    let provider = SeedProvider::empty();
    assert!(provider.list_classes().await.unwrap().is_empty());
    assert!(provider.list_definitions().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_seed_is_a_provider_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = SeedProvider::new(dir.path().join("missing.json"));
    assert!(matches!(missing.list_classes().await, Err(EngineError::Provider(_))));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let broken = SeedProvider::new(&path);
    assert!(matches!(broken.list_definitions().await, Err(EngineError::Provider(_))));
}
