//! SQLite storage layer for model management.
//!
//! The in-memory store is rebuilt on startup from the upstream providers;
//! this crate persists what happened after that: committed change-sets,
//! deployments and the model/deployed version counters.

mod change_set_store;
mod error;

pub use change_set_store::ChangeSetStore;
pub use error::{StorageError, StorageResult};
