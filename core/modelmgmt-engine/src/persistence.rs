//! Change log collaborators.
//!
//! The manager hands every successful commit and deployment to a
//! [`ChangeLog`] after the in-memory swap, and reads it back on load.

use crate::error::EngineResult;
use modelmgmt_model::{ChangeHistory, ChangeSetStatus, DeploymentRecord, ModelChangeSetInfo};
use modelmgmt_storage::ChangeSetStore;
use std::sync::{Mutex, PoisonError};

pub trait ChangeLog: Send + Sync {
    /// Records a committed batch and the model version it produced.
    fn record_commit(&self, version: u64, change_sets: &[ModelChangeSetInfo]) -> EngineResult<()>;

    /// Records a deployment.
    fn record_deployment(&self, record: &DeploymentRecord) -> EngineResult<()>;

    /// Loads everything recorded so far.
    fn load(&self) -> EngineResult<ChangeHistory>;
}

/// Keeps the log in memory. Survives reloads, not restarts.
#[derive(Debug, Default)]
pub struct MemoryChangeLog {
    history: Mutex<ChangeHistory>,
}

impl MemoryChangeLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChangeLog for MemoryChangeLog {
    fn record_commit(&self, version: u64, change_sets: &[ModelChangeSetInfo]) -> EngineResult<()> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.change_sets.extend_from_slice(change_sets);
        history.model_version = history.model_version.max(version);
        Ok(())
    }

    fn record_deployment(&self, record: &DeploymentRecord) -> EngineResult<()> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        for info in history
            .change_sets
            .iter_mut()
            .filter(|info| record.change_sets.contains(&info.id))
        {
            info.status = ChangeSetStatus::Deployed;
        }
        history.deployments.push(record.clone());
        history.deployed_version = history.deployed_version.max(record.version);
        Ok(())
    }

    fn load(&self) -> EngineResult<ChangeHistory> {
        Ok(self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

impl ChangeLog for ChangeSetStore {
    fn record_commit(&self, version: u64, change_sets: &[ModelChangeSetInfo]) -> EngineResult<()> {
        Ok(self.save_commit(version, change_sets)?)
    }

    fn record_deployment(&self, record: &DeploymentRecord) -> EngineResult<()> {
        Ok(self.save_deployment(record)?)
    }

    fn load(&self) -> EngineResult<ChangeHistory> {
        Ok(ChangeSetStore::load(self)?)
    }
}
