//! Model manager: the shared, versioned model service.
//!
//! Readers take `Arc` snapshots and never block writers for longer than a
//! pointer swap. Updates, deployments and reloads are serialized through a
//! single writer lock. The change log is written after that lock is released,
//! under a log lock taken before the release, so entries reach the log in
//! commit order.

use crate::deploy::{DeployedModels, DeploymentCandidate, DeploymentSelector};
use crate::error::EngineResult;
use crate::history::ChangeSetHistory;
use crate::persistence::ChangeLog;
use crate::provider::{ClassProvider, DefinitionProvider};
use crate::update::UpdateEngine;
use chrono::Utc;
use modelmgmt_model::{
    ChangeHistory, DeploymentRecord, ModelChangeSetInfo, ModelDeploymentRequest,
    ModelHierarchyClass, ModelResponse, ModelUpdateRequest, ModelUpdateResponse, Models,
    ModelsMetaInfo,
};
use modelmgmt_types::DeploymentId;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// Configuration for the model manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Write commits and deployments to the change log.
    pub persist_changes: bool,
    /// Attribute catalog the store validates against.
    pub meta_info: ModelsMetaInfo,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            persist_changes: true,
            meta_info: ModelsMetaInfo::standard(),
        }
    }
}

struct State {
    models: Arc<Models>,
    deployed: Arc<Models>,
    history: ChangeSetHistory,
}

pub struct ModelManager {
    config: ManagerConfig,
    engine: UpdateEngine,
    classes: Arc<dyn ClassProvider>,
    definitions: Arc<dyn DefinitionProvider>,
    change_log: Arc<dyn ChangeLog>,
    state: RwLock<State>,
    writer: Mutex<()>,
    /// Always acquired while holding `writer`.
    log: Mutex<()>,
}

impl ModelManager {
    /// Creates a manager with an empty store. Call [`ModelManager::reload`]
    /// (or use [`ModelManager::load`]) to populate it.
    pub fn new(
        config: ManagerConfig,
        classes: Arc<dyn ClassProvider>,
        definitions: Arc<dyn DefinitionProvider>,
        change_log: Arc<dyn ChangeLog>,
    ) -> Self {
        let empty = Arc::new(Models::new(config.meta_info.clone()));
        Self {
            config,
            engine: UpdateEngine::default(),
            classes,
            definitions,
            change_log,
            state: RwLock::new(State {
                models: empty.clone(),
                deployed: empty,
                history: ChangeSetHistory::new(),
            }),
            writer: Mutex::new(()),
            log: Mutex::new(()),
        }
    }

    /// Creates a manager and loads it from the providers and the change log.
    pub async fn load(
        config: ManagerConfig,
        classes: Arc<dyn ClassProvider>,
        definitions: Arc<dyn DefinitionProvider>,
        change_log: Arc<dyn ChangeLog>,
    ) -> EngineResult<Self> {
        let manager = Self::new(config, classes, definitions, change_log);
        manager.reload().await?;
        Ok(manager)
    }

    /// Replaces the operation set used for updates.
    pub fn with_engine(mut self, engine: UpdateEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writer(&self) -> std::sync::MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, ()> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Rebuilds the store from the providers and replays the change log.
    pub async fn reload(&self) -> EngineResult<()> {
        let classes = self.classes.list_classes().await?;
        let definitions = self.definitions.list_definitions().await?;
        let base = Models::from_nodes(classes, definitions, self.config.meta_info.clone())?;

        let _writer = self.lock_writer();
        let log = {
            let _log = self.lock_log();
            self.change_log.load()?
        };
        let (models, deployed, history) = replay(base, log);
        info!(
            version = models.version(),
            deployed_version = deployed.version(),
            classes = models.classes().len(),
            definitions = models.definitions().len(),
            changes = history.len(),
            "loaded models"
        );

        let mut state = self.write_state();
        state.models = Arc::new(models);
        state.deployed = Arc::new(deployed);
        state.history = history;
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Current draft snapshot.
    pub fn models(&self) -> Arc<Models> {
        self.read_state().models.clone()
    }

    /// Current deployed projection.
    pub fn deployed_models(&self) -> Arc<Models> {
        self.read_state().deployed.clone()
    }

    pub fn version(&self) -> u64 {
        self.read_state().models.version()
    }

    pub fn deployed_version(&self) -> u64 {
        self.read_state().deployed.version()
    }

    pub fn meta_info(&self) -> ModelsMetaInfo {
        self.read_state().models.meta_info().clone()
    }

    pub fn hierarchy(&self) -> Vec<ModelHierarchyClass> {
        self.models().hierarchy()
    }

    pub fn select(&self, id: &str) -> ModelResponse {
        self.models().select(id)
    }

    /// Every committed change-set.
    pub fn history(&self) -> Vec<ModelChangeSetInfo> {
        self.read_state().history.entries().to_vec()
    }

    /// Change-sets committed after `version`.
    pub fn changes_since(&self, version: u64) -> Vec<ModelChangeSetInfo> {
        self.read_state().history.since(version)
    }

    pub fn deployment_candidates(&self) -> Vec<DeploymentCandidate> {
        DeploymentSelector::candidates(&self.read_state().history)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Applies a batch of change-sets.
    ///
    /// On success the response carries the new version and every change-set
    /// committed after the version the client sent.
    pub fn update(&self, request: &ModelUpdateRequest) -> EngineResult<ModelUpdateResponse> {
        let writer = self.lock_writer();
        let current = self.models();

        let committed = match self.engine.update(&current, request) {
            Ok(Some(committed)) => committed,
            Ok(None) => {
                debug!(client_version = request.model_version, "empty update request");
                return Ok(ModelUpdateResponse {
                    model_version: current.version(),
                    change_sets: self.changes_since(request.model_version),
                });
            }
            Err(e) => {
                warn!(
                    client_version = request.model_version,
                    version = current.version(),
                    changes = request.changes.len(),
                    error = %e,
                    "rejected model update"
                );
                return Err(e);
            }
        };

        let version = committed.models.version();
        let (recorded, response) = {
            let mut state = self.write_state();
            let recorded = state
                .history
                .record(version, committed.changes, Utc::now());
            state.models = Arc::new(committed.models);
            let response = ModelUpdateResponse {
                model_version: version,
                change_sets: state.history.since(request.model_version),
            };
            (recorded, response)
        };
        let log = self.lock_log();
        drop(writer);

        info!(version, changes = recorded.len(), "committed model update");
        if self.config.persist_changes {
            if let Err(e) = self.change_log.record_commit(version, &recorded) {
                error!(version, error = %e, "failed to persist committed change-sets");
            }
        }
        drop(log);
        Ok(response)
    }

    /// Promotes the named change-sets into the deployed projection.
    pub fn deploy(&self, request: &ModelDeploymentRequest) -> EngineResult<DeployedModels> {
        let writer = self.lock_writer();

        let (ids, next) = {
            let state = self.read_state();
            let selected = DeploymentSelector::select(
                &state.history,
                state.deployed.version(),
                request,
            )
            .and_then(|ids| {
                DeploymentSelector::materialize(&state.deployed, &state.history, &ids)
                    .map(|next| (ids, next))
            });
            match selected {
                Ok(selected) => selected,
                Err(e) => {
                    warn!(
                        requested_version = request.version,
                        deployed_version = state.deployed.version(),
                        error = %e,
                        "rejected deployment"
                    );
                    return Err(e);
                }
            }
        };

        let record = DeploymentRecord {
            id: DeploymentId::new(),
            version: next.version(),
            change_sets: ids,
            deployed_at: Utc::now(),
        };
        let deployed = {
            let mut state = self.write_state();
            state.history.mark_deployed(&record.change_sets);
            state.deployed = Arc::new(next);
            DeployedModels {
                id: record.id,
                version: record.version,
                deployed: record
                    .change_sets
                    .iter()
                    .filter_map(|id| state.history.get(*id).cloned())
                    .collect(),
                pending: state.history.pending().map(|info| info.id).collect(),
            }
        };
        let log = self.lock_log();
        drop(writer);

        info!(
            deployed_version = record.version,
            changes = record.change_sets.len(),
            pending = deployed.pending.len(),
            "deployed change-sets"
        );
        if self.config.persist_changes {
            if let Err(e) = self.change_log.record_deployment(&record) {
                error!(deployed_version = record.version, error = %e, "failed to persist deployment");
            }
        }
        drop(log);
        Ok(deployed)
    }
}

/// Replays a persisted log onto a freshly built base snapshot.
///
/// Entries whose selectors no longer resolve against the providers' data are
/// skipped with a warning.
fn replay(base: Models, log: ChangeHistory) -> (Models, Models, ChangeSetHistory) {
    let history = ChangeSetHistory::from_entries(log.change_sets);

    let mut models = base.clone();
    for info in history.entries() {
        if let Err(e) = models.apply_recorded(&info.applied) {
            warn!(id = %info.id, selector = %info.applied.selector, error = %e, "skipping change-set on replay");
        }
    }
    let last_version = history.entries().iter().map(|i| i.version).max().unwrap_or(0);
    models.restore_version(log.model_version.max(last_version));

    let mut deployed = base;
    for record in &log.deployments {
        for id in &record.change_sets {
            let Some(info) = history.get(*id) else {
                warn!(id = %id, deployment = %record.id, "deployment names unknown change-set");
                continue;
            };
            if let Err(e) = deployed.apply_recorded(&info.applied) {
                warn!(id = %id, error = %e, "skipping deployed change-set on replay");
            }
        }
    }
    let last_deployment = log.deployments.iter().map(|d| d.version).max().unwrap_or(0);
    deployed.restore_version(log.deployed_version.max(last_deployment));

    (models, deployed, history)
}
