//! Error types for the update and deployment engine.

use modelmgmt_model::ModelError;
use modelmgmt_storage::StorageError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// A business-rule failure for one change-set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub selector: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.selector, self.message)
    }
}

/// A change-set whose `oldValue` no longer matches the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollisionEntry {
    pub selector: String,
    pub expected: Value,
    pub actual: Value,
}

/// Every collision found in one rejected batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSetCollision {
    pub collisions: Vec<CollisionEntry>,
}

impl ChangeSetCollision {
    pub fn len(&self) -> usize {
        self.collisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty()
    }
}

/// Errors that can occur while updating or deploying models.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A selector did not resolve.
    #[error("model node not found for selector: {selector}")]
    NotFound { selector: String },

    /// One or more change-sets failed validation.
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    /// One or more change-sets were built against values that changed since.
    #[error("{} change-set(s) collide with newer changes", .0.len())]
    Collision(ChangeSetCollision),

    /// The deployment was built against an older deployed version.
    #[error("deployment based on version {expected}, deployed version is {actual}")]
    StaleDeployment { expected: u64, actual: u64 },

    /// The deployment request names nothing.
    #[error("deployment request does not name any change-sets")]
    EmptyDeployment,

    /// An upstream class or definition provider failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// Change log error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Model store error outside a single change-set.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl EngineError {
    /// True for the only error a client recovers from by re-fetching and re-diffing.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Collision(_))
    }

    /// True for rejected requests (validation, stale or empty deployments).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::StaleDeployment { .. } | Self::EmptyDeployment
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
