//! Engine errors as HTTP responses.
//!
//! Every failure uses the same body shape existing clients parse:
//!
//! ```json
//! {"code":0,"message":"...","errors":{"<selector>":{"type":"collision","message":"...","error":true}}}
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use modelmgmt_engine::EngineError;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
    pub errors: BTreeMap<String, ErrorEntry>,
}

/// A failed request: status plus body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: 0,
                message: message.into(),
                errors: BTreeMap::new(),
            },
        }
    }

    /// Adds an entry for `selector`. A second entry for the same selector is
    /// folded into the first one's message.
    fn with_entry(mut self, selector: String, kind: &'static str, message: String) -> Self {
        self.body
            .errors
            .entry(selector)
            .and_modify(|entry| {
                entry.message.push_str("; ");
                entry.message.push_str(&message);
            })
            .or_insert(ErrorEntry {
                kind,
                message,
                error: true,
            });
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::Collision(collision) => collision.collisions.into_iter().fold(
                Self::new(StatusCode::CONFLICT, message),
                |api, c| {
                    api.with_entry(
                        c.selector,
                        "collision",
                        format!("expected {}, found {}", c.expected, c.actual),
                    )
                },
            ),
            EngineError::Validation(errors) => errors.into_iter().fold(
                Self::new(StatusCode::BAD_REQUEST, "validation failed"),
                |api, e| api.with_entry(e.selector, "validation", e.message),
            ),
            EngineError::NotFound { selector } => {
                Self::new(StatusCode::NOT_FOUND, message.clone()).with_entry(selector, "notFound", message)
            }
            EngineError::StaleDeployment { .. } | EngineError::EmptyDeployment => {
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            EngineError::Provider(_) | EngineError::Storage(_) | EngineError::Model(_) => {
                error!(error = %message, "request failed");
                Self::internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
