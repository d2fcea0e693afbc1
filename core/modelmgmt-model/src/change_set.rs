//! Wire types for updates, change history and deployment.

use chrono::{DateTime, Utc};
use modelmgmt_types::{ChangeSetId, DeploymentId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One requested change.
///
/// `old_value` is what the client saw when it built the change. It is only
/// compared against the store when the client's model version is stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelChangeSet {
    pub selector: String,
    pub operation: String,
    #[serde(default)]
    pub old_value: Value,
    #[serde(default)]
    pub new_value: Value,
}

impl ModelChangeSet {
    pub fn new(selector: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            operation: operation.into(),
            old_value: Value::Null,
            new_value: Value::Null,
        }
    }

    pub fn with_old_value(mut self, value: Value) -> Self {
        self.old_value = value;
        self
    }

    pub fn with_new_value(mut self, value: Value) -> Self {
        self.new_value = value;
        self
    }
}

/// A batch of changes built against `model_version`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUpdateRequest {
    pub model_version: u64,
    #[serde(default)]
    pub changes: Vec<ModelChangeSet>,
}

impl ModelUpdateRequest {
    pub fn new(model_version: u64) -> Self {
        Self {
            model_version,
            changes: Vec::new(),
        }
    }

    pub fn with_change(mut self, change: ModelChangeSet) -> Self {
        self.changes.push(change);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// The attribute write an operation actually performed.
///
/// Replaying these in commit order reproduces the store. When `language` is
/// set the change touches only that translation of the label: both values
/// are the text in that language, and replay merges it into whatever labels
/// the target holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedChange {
    pub selector: String,
    pub attribute: String,
    pub old_value: Value,
    pub new_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSetStatus {
    #[default]
    Draft,
    Deployed,
}

impl ChangeSetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Deployed => "deployed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "deployed" => Some(Self::Deployed),
            _ => None,
        }
    }
}

/// A committed change with its history metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelChangeSetInfo {
    pub id: ChangeSetId,
    /// Model version produced by the commit that contained this change.
    pub version: u64,
    pub change_set: ModelChangeSet,
    pub applied: AppliedChange,
    pub committed_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ChangeSetStatus,
}

impl ModelChangeSetInfo {
    pub fn is_deployed(&self) -> bool {
        self.status == ChangeSetStatus::Deployed
    }
}

/// Answer to an update: the new version and every change committed after
/// the version the client sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUpdateResponse {
    pub model_version: u64,
    pub change_sets: Vec<ModelChangeSetInfo>,
}

/// Requests deployment of the named change-sets.
///
/// `version` is the deployed version the client last saw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDeploymentRequest {
    #[serde(default)]
    pub models_to_deploy: Vec<String>,
    pub version: u64,
}

impl ModelDeploymentRequest {
    pub fn new(version: u64) -> Self {
        Self {
            models_to_deploy: Vec::new(),
            version,
        }
    }

    pub fn with_model(mut self, id: impl Into<String>) -> Self {
        self.models_to_deploy.push(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.models_to_deploy.is_empty()
    }
}

/// One committed deployment: the change-sets it promoted, in the order they
/// were materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub id: DeploymentId,
    /// Deployed version produced by this deployment.
    pub version: u64,
    pub change_sets: Vec<ChangeSetId>,
    pub deployed_at: DateTime<Utc>,
}

/// Everything needed to rebuild the store after a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeHistory {
    pub model_version: u64,
    pub deployed_version: u64,
    /// Committed change-sets in id order.
    pub change_sets: Vec<ModelChangeSetInfo>,
    /// Deployments in the order they happened.
    pub deployments: Vec<DeploymentRecord>,
}

impl ChangeHistory {
    pub fn is_empty(&self) -> bool {
        self.change_sets.is_empty() && self.deployments.is_empty()
    }
}
