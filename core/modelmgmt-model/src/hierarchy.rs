//! Class → definition hierarchy.
//!
//! A pure projection of a snapshot: each class lists the definitions whose
//! `rdfType` names it. Classes stay flat (one entry per class, carrying
//! `parentId`); the client nests them.

use crate::node::{Labels, ModelClass, ModelDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHierarchyClass {
    pub id: String,
    pub parent_id: Option<String>,
    pub labels: Labels,
    pub sub_types: Vec<ModelHierarchyDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHierarchyDefinition {
    pub id: String,
    pub parent_id: Option<String>,
    pub is_abstract: bool,
    pub labels: Labels,
}

impl From<&ModelDefinition> for ModelHierarchyDefinition {
    fn from(definition: &ModelDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            parent_id: definition.parent_id.clone(),
            is_abstract: definition.is_abstract,
            labels: definition.labels.clone(),
        }
    }
}

/// Builds the hierarchy. Classes come out in input order, and each class's
/// sub-types keep the input order of the definitions.
pub fn build_hierarchy<'a>(
    classes: impl IntoIterator<Item = &'a ModelClass>,
    definitions: impl IntoIterator<Item = &'a ModelDefinition>,
) -> Vec<ModelHierarchyClass> {
    let mut by_type: HashMap<&str, Vec<ModelHierarchyDefinition>> = HashMap::new();
    for definition in definitions {
        if !definition.has_rdf_type() {
            continue;
        }
        if let Some(rdf_type) = definition.rdf_type.as_deref() {
            by_type
                .entry(rdf_type)
                .or_default()
                .push(ModelHierarchyDefinition::from(definition));
        }
    }

    classes
        .into_iter()
        .map(|class| ModelHierarchyClass {
            id: class.id.clone(),
            parent_id: class.parent_id.clone(),
            labels: class.labels.clone(),
            sub_types: by_type.remove(class.id.as_str()).unwrap_or_default(),
        })
        .collect()
}
