//! Error types for the model store.

use crate::node::NodeKind;
use thiserror::Error;

/// Result type for model store operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by the model store and selector resolution.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A selector did not resolve to an existing node.
    #[error("model node not found for selector: {selector}")]
    NotFound { selector: String },

    /// A selector string could not be parsed.
    #[error("malformed selector '{selector}': {reason}")]
    MalformedSelector { selector: String, reason: String },

    /// A parent link points at a node that does not exist.
    #[error("{kind} '{id}' references missing parent '{parent}'")]
    DanglingReference {
        kind: NodeKind,
        id: String,
        parent: String,
    },

    /// A parent link would close a loop in the inheritance tree.
    #[error("{kind} '{id}' would form an inheritance cycle")]
    Cycle { kind: NodeKind, id: String },

    /// The attribute cannot be carried by this kind of node.
    #[error("attribute '{attribute}' is not supported on {kind} nodes")]
    UnsupportedAttribute { kind: NodeKind, attribute: String },

    /// The value does not fit the attribute's storage shape.
    #[error("invalid value for attribute '{attribute}': {reason}")]
    InvalidValue { attribute: String, reason: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
