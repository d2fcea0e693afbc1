//! Change-set processing for model management.
//!
//! # Architecture
//!
//! - **Operations**: one [`ChangeSetOperation`] per change kind, looked up by
//!   name in an [`OperationRegistry`]
//! - **Update engine**: collision detection, validation and atomic apply of a
//!   batch against a store snapshot ([`UpdateEngine`])
//! - **History**: committed change-sets with stable ids ([`ChangeSetHistory`])
//! - **Deployment**: promotes a chosen subset of pending change-sets into the
//!   deployed projection ([`DeploymentSelector`])
//! - **Manager**: the shared service that owns the snapshots and serializes
//!   writers ([`ModelManager`])
//!
//! ## Update flow
//!
//! 1. **Collisions**: when the client's version is stale, every change-set's
//!    `oldValue` is compared with the live value; any mismatch rejects the batch
//! 2. **Validation**: each change-set is resolved, checked by its operation and
//!    applied to a working copy; any failure rejects the batch
//! 3. **Commit**: the working copy replaces the snapshot with its version
//!    advanced by one
//! 4. **Persist**: the change log records the batch after the swap
//!
//! # Example
//!
//! ```
//! use modelmgmt_engine::{ManagerConfig, MemoryChangeLog, ModelManager};
//! use modelmgmt_engine::mock::StaticProvider;
//! use std::sync::Arc;
//!
//! let provider = Arc::new(StaticProvider::default());
//! let manager = ModelManager::new(
//!     ManagerConfig::default(),
//!     provider.clone(),
//!     provider,
//!     Arc::new(MemoryChangeLog::new()),
//! );
//! assert_eq!(manager.version(), 0);
//! ```

mod deploy;
mod error;
mod history;
mod manager;
pub mod operation;
mod persistence;
mod provider;
mod update;

pub use deploy::{DeployedModels, DeploymentCandidate, DeploymentSelector};
pub use error::{ChangeSetCollision, CollisionEntry, EngineError, EngineResult, ValidationError};
pub use history::ChangeSetHistory;
pub use manager::{ManagerConfig, ModelManager};
pub use operation::{ChangeSetOperation, OperationRegistry};
pub use persistence::{ChangeLog, MemoryChangeLog};
pub use provider::{mock, ClassProvider, DefinitionProvider};
pub use update::{CommittedUpdate, UpdateEngine};
