//! Core type definitions for model management.
//!
//! This crate defines the small building blocks shared by
//! the model store, the change log and the update engine:
//! - Change-set identifiers (global monotonic counter)
//! - Deployment identifiers (UUID v7)
//! - Helpers over attribute values (`serde_json::Value`)

mod ids;
mod value;

pub use ids::{ChangeSetId, DeploymentId};
pub use value::{is_empty_value, value_kind};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid change-set id: {0}")]
    InvalidChangeSetId(String),
}
