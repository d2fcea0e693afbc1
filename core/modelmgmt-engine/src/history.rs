//! Committed change-set history.

use chrono::{DateTime, Utc};
use modelmgmt_model::{AppliedChange, ChangeSetStatus, ModelChangeSet, ModelChangeSetInfo};
use modelmgmt_types::ChangeSetId;

/// Every committed change-set in commit order, plus the id counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSetHistory {
    entries: Vec<ModelChangeSetInfo>,
    next_id: ChangeSetId,
}

impl ChangeSetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the history from persisted entries. The id counter resumes
    /// after the highest id seen.
    pub fn from_entries(mut entries: Vec<ModelChangeSetInfo>) -> Self {
        entries.sort_by_key(|e| e.id);
        let next_id = entries
            .last()
            .map(|e| e.id.next())
            .unwrap_or(ChangeSetId::FIRST);
        Self { entries, next_id }
    }

    /// Records one committed batch, assigning ids in request order.
    pub fn record(
        &mut self,
        version: u64,
        changes: Vec<(ModelChangeSet, AppliedChange)>,
        committed_at: DateTime<Utc>,
    ) -> Vec<ModelChangeSetInfo> {
        let recorded: Vec<ModelChangeSetInfo> = changes
            .into_iter()
            .map(|(change_set, applied)| {
                let id = self.next_id;
                self.next_id = id.next();
                ModelChangeSetInfo {
                    id,
                    version,
                    change_set,
                    applied,
                    committed_at,
                    status: ChangeSetStatus::Draft,
                }
            })
            .collect();
        self.entries.extend(recorded.iter().cloned());
        recorded
    }

    /// Change-sets committed after `version`.
    pub fn since(&self, version: u64) -> Vec<ModelChangeSetInfo> {
        self.entries
            .iter()
            .filter(|e| e.version > version)
            .cloned()
            .collect()
    }

    /// Change-sets not yet deployed, in commit order.
    pub fn pending(&self) -> impl Iterator<Item = &ModelChangeSetInfo> {
        self.entries.iter().filter(|e| !e.is_deployed())
    }

    pub fn get(&self, id: ChangeSetId) -> Option<&ModelChangeSetInfo> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|pos| &self.entries[pos])
    }

    /// Marks the given change-sets as deployed. Unknown ids are ignored.
    pub fn mark_deployed(&mut self, ids: &[ChangeSetId]) {
        for id in ids {
            if let Ok(pos) = self.entries.binary_search_by_key(id, |e| e.id) {
                self.entries[pos].status = ChangeSetStatus::Deployed;
            }
        }
    }

    pub fn entries(&self) -> &[ModelChangeSetInfo] {
        &self.entries
    }

    /// The id the next committed change-set will get.
    pub fn next_id(&self) -> ChangeSetId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
