use crate::node::{ModelClass, ModelDefinition};
use serde::{Deserialize, Serialize};

/// Result of selecting a single model: the node plus its ancestors.
///
/// Both lists are ordered child first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub classes: Vec<ModelClass>,
    pub definitions: Vec<ModelDefinition>,
}

impl ModelResponse {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.definitions.is_empty()
    }
}
