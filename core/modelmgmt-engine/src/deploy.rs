//! Deployment selection.
//!
//! Committed change-sets stay in draft until a deployment names them. The
//! deployed projection is its own `Models` snapshot, advanced by replaying
//! the recorded writes of exactly the selected change-sets.

use crate::error::{EngineError, EngineResult, ValidationError};
use crate::history::ChangeSetHistory;
use modelmgmt_model::{
    ModelChangeSetInfo, ModelDeploymentRequest, Models, NodeKind, Selector,
};
use modelmgmt_types::{ChangeSetId, DeploymentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A node with pending changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCandidate {
    pub id: String,
    pub kind: NodeKind,
    pub change_sets: Vec<ChangeSetId>,
}

/// Result of a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedModels {
    pub id: DeploymentId,
    /// Deployed version after this deployment.
    pub version: u64,
    pub deployed: Vec<ModelChangeSetInfo>,
    /// Change-sets still waiting for deployment.
    pub pending: Vec<ChangeSetId>,
}

pub struct DeploymentSelector;

impl DeploymentSelector {
    /// Groups pending change-sets by the top-level node they touch, in the
    /// order nodes were first touched.
    pub fn candidates(history: &ChangeSetHistory) -> Vec<DeploymentCandidate> {
        let mut candidates: Vec<DeploymentCandidate> = Vec::new();
        for info in history.pending() {
            let Some((kind, id)) = root_of(info) else {
                continue;
            };
            match candidates.iter_mut().find(|c| c.kind == kind && c.id == id) {
                Some(candidate) => candidate.change_sets.push(info.id),
                None => candidates.push(DeploymentCandidate {
                    id,
                    kind,
                    change_sets: vec![info.id],
                }),
            }
        }
        candidates
    }

    /// Checks a request and returns the selected ids in commit order.
    pub fn select(
        history: &ChangeSetHistory,
        deployed_version: u64,
        request: &ModelDeploymentRequest,
    ) -> EngineResult<Vec<ChangeSetId>> {
        if request.is_empty() {
            return Err(EngineError::EmptyDeployment);
        }
        if request.version != deployed_version {
            return Err(EngineError::StaleDeployment {
                expected: request.version,
                actual: deployed_version,
            });
        }

        let mut selected = BTreeSet::new();
        let mut errors = Vec::new();
        for raw in &request.models_to_deploy {
            let id = match ChangeSetId::parse(raw) {
                Ok(id) => id,
                Err(e) => {
                    errors.push(ValidationError::new(raw.clone(), e.to_string()));
                    continue;
                }
            };
            match history.get(id) {
                None => errors.push(ValidationError::new(raw.clone(), "unknown change-set")),
                Some(info) if info.is_deployed() => {
                    errors.push(ValidationError::new(raw.clone(), "change-set is already deployed"))
                }
                Some(_) => {
                    selected.insert(id);
                }
            }
        }

        if !errors.is_empty() {
            return Err(EngineError::Validation(errors));
        }
        Ok(selected.into_iter().collect())
    }

    /// Replays the selected change-sets onto a copy of the deployed
    /// projection and advances its version.
    pub fn materialize(
        deployed: &Models,
        history: &ChangeSetHistory,
        ids: &[ChangeSetId],
    ) -> EngineResult<Models> {
        let mut next = deployed.clone();
        let mut errors = Vec::new();
        for id in ids {
            let Some(info) = history.get(*id) else {
                errors.push(ValidationError::new(id.to_string(), "unknown change-set"));
                continue;
            };
            if let Err(e) = next.apply_recorded(&info.applied) {
                errors.push(ValidationError::new(id.to_string(), e.to_string()));
            }
        }
        if !errors.is_empty() {
            return Err(EngineError::Validation(errors));
        }
        next.increment_version();
        Ok(next)
    }
}

fn root_of(info: &ModelChangeSetInfo) -> Option<(NodeKind, String)> {
    let selector = Selector::parse(&info.applied.selector).ok()?;
    let root = selector.segments().first()?;
    Some((root.kind, root.id.clone()))
}
