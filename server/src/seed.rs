//! Class and definition provider backed by a JSON seed file.

use async_trait::async_trait;
use modelmgmt_engine::{ClassProvider, DefinitionProvider, EngineError, EngineResult};
use modelmgmt_model::{ModelClass, ModelDefinition};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeedFile {
    classes: Vec<ModelClass>,
    definitions: Vec<ModelDefinition>,
}

/// Reads `{"classes": [...], "definitions": [...]}` from disk on every call,
/// so a reload sees edits to the file. Without a path it serves nothing.
#[derive(Debug, Clone, Default)]
pub struct SeedProvider {
    path: Option<PathBuf>,
}

impl SeedProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    async fn read(&self) -> EngineResult<SeedFile> {
        let Some(path) = &self.path else {
            return Ok(SeedFile::default());
        };
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::Provider(format!("reading {}: {e}", path.display())))?;
        let seed: SeedFile = serde_json::from_str(&contents)
            .map_err(|e| EngineError::Provider(format!("parsing {}: {e}", path.display())))?;
        debug!(
            path = %path.display(),
            classes = seed.classes.len(),
            definitions = seed.definitions.len(),
            "read seed file"
        );
        Ok(seed)
    }
}

#[async_trait]
impl ClassProvider for SeedProvider {
    async fn list_classes(&self) -> EngineResult<Vec<ModelClass>> {
        Ok(self.read().await?.classes)
    }
}

#[async_trait]
impl DefinitionProvider for SeedProvider {
    async fn list_definitions(&self) -> EngineResult<Vec<ModelDefinition>> {
        Ok(self.read().await?.definitions)
    }
}
