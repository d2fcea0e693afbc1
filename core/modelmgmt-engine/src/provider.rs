//! Upstream providers of raw class and definition data.
//!
//! The store is built from these at startup and on reload; nothing is ever
//! written back to them.

use crate::error::EngineResult;
use async_trait::async_trait;
use modelmgmt_model::{ModelClass, ModelDefinition};

/// Supplies the current semantic classes.
#[async_trait]
pub trait ClassProvider: Send + Sync {
    async fn list_classes(&self) -> EngineResult<Vec<ModelClass>>;
}

/// Supplies the current structural definitions.
#[async_trait]
pub trait DefinitionProvider: Send + Sync {
    async fn list_definitions(&self) -> EngineResult<Vec<ModelDefinition>>;
}

/// In-memory providers for testing.
pub mod mock {
    use super::*;
    use crate::error::EngineError;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Serves whatever classes and definitions it was last given.
    #[derive(Debug, Clone, Default)]
    pub struct StaticProvider {
        classes: Arc<Mutex<Vec<ModelClass>>>,
        definitions: Arc<Mutex<Vec<ModelDefinition>>>,
    }

    impl StaticProvider {
        pub fn new(classes: Vec<ModelClass>, definitions: Vec<ModelDefinition>) -> Self {
            Self {
                classes: Arc::new(Mutex::new(classes)),
                definitions: Arc::new(Mutex::new(definitions)),
            }
        }

        pub fn set_classes(&self, classes: Vec<ModelClass>) {
            *self.classes.lock().unwrap_or_else(PoisonError::into_inner) = classes;
        }

        pub fn set_definitions(&self, definitions: Vec<ModelDefinition>) {
            *self.definitions.lock().unwrap_or_else(PoisonError::into_inner) = definitions;
        }
    }

    #[async_trait]
    impl ClassProvider for StaticProvider {
        async fn list_classes(&self) -> EngineResult<Vec<ModelClass>> {
            Ok(self.classes.lock().unwrap_or_else(PoisonError::into_inner).clone())
        }
    }

    #[async_trait]
    impl DefinitionProvider for StaticProvider {
        async fn list_definitions(&self) -> EngineResult<Vec<ModelDefinition>> {
            Ok(self
                .definitions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone())
        }
    }

    /// Always fails; for exercising startup error paths.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UnavailableProvider;

    #[async_trait]
    impl ClassProvider for UnavailableProvider {
        async fn list_classes(&self) -> EngineResult<Vec<ModelClass>> {
            Err(EngineError::Provider("class provider unavailable".into()))
        }
    }

    #[async_trait]
    impl DefinitionProvider for UnavailableProvider {
        async fn list_definitions(&self) -> EngineResult<Vec<ModelDefinition>> {
            Err(EngineError::Provider("definition provider unavailable".into()))
        }
    }
}
