//! Shared fixtures for engine tests.

#![allow(dead_code)]

use modelmgmt_engine::mock::StaticProvider;
use modelmgmt_engine::{ChangeLog, ManagerConfig, MemoryChangeLog, ModelManager};
use modelmgmt_model::{
    ModelChangeSet, ModelClass, ModelDefinition, ModelField, ModelRegion, ModelUpdateRequest,
    Models, ModelsMetaInfo,
};
use serde_json::Value;
use std::sync::Arc;

pub const TITLE: &str = "definition=PR0001/field=title";
pub const DESCRIPTION: &str = "definition=PR0001/field=description";

pub fn classes() -> Vec<ModelClass> {
    vec![
        ModelClass::new("emf:Entity").with_label("en", "Entity"),
        ModelClass::new("emf:Case")
            .with_parent("emf:Entity")
            .with_label("en", "Case"),
    ]
}

pub fn definitions() -> Vec<ModelDefinition> {
    vec![
        ModelDefinition::new("base")
            .with_abstract(true)
            .with_region(ModelRegion::new("previousRegion"))
            .with_region(ModelRegion::new("newRegion")),
        ModelDefinition::new("PR0001")
            .with_parent("base")
            .with_rdf_type("emf:Case")
            .with_label("en", "Project")
            .with_field(
                ModelField::new("title")
                    .with_label("en", "Title")
                    .with_region("previousRegion"),
            )
            .with_field(ModelField::new("description"))
            .with_region(ModelRegion::new("details")),
    ]
}

/// The fixture store advanced to `version`.
pub fn store_at(version: u64) -> Models {
    let mut models = Models::from_nodes(classes(), definitions(), ModelsMetaInfo::standard())
        .expect("fixture is consistent");
    models.restore_version(version);
    models
}

/// A definition with `count` fields `f0..`, each assigned to region `r0`.
pub fn wide_store(count: usize) -> Models {
    let mut definition = ModelDefinition::new("wide")
        .with_region(ModelRegion::new("r0"))
        .with_region(ModelRegion::new("r1"));
    for i in 0..count {
        definition = definition.with_field(ModelField::new(format!("f{i}")).with_region("r0"));
    }
    Models::from_nodes(vec![], vec![definition], ModelsMetaInfo::standard())
        .expect("fixture is consistent")
}

pub fn change(selector: &str, operation: &str, old: Value, new: Value) -> ModelChangeSet {
    ModelChangeSet::new(selector, operation)
        .with_old_value(old)
        .with_new_value(new)
}

pub fn request(version: u64, changes: Vec<ModelChangeSet>) -> ModelUpdateRequest {
    ModelUpdateRequest {
        model_version: version,
        changes,
    }
}

pub fn provider() -> Arc<StaticProvider> {
    Arc::new(StaticProvider::new(classes(), definitions()))
}

pub async fn manager_with_log(log: Arc<dyn ChangeLog>) -> ModelManager {
    let provider = provider();
    ModelManager::load(ManagerConfig::default(), provider.clone(), provider, log)
        .await
        .expect("manager loads")
}

pub async fn manager() -> ModelManager {
    manager_with_log(Arc::new(MemoryChangeLog::new())).await
}
