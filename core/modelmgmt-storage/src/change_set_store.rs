//! Durable log of committed change-sets and deployments.
//!
//! Stores only what the engine needs to rebuild its state on restart: the
//! recorded changes, the deployments that promoted them and the two version
//! counters. Node data itself comes from the upstream providers.

use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use modelmgmt_model::{
    AppliedChange, ChangeHistory, ChangeSetStatus, DeploymentRecord, ModelChangeSet,
    ModelChangeSetInfo,
};
use modelmgmt_types::{ChangeSetId, DeploymentId};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

const MODEL_VERSION_KEY: &str = "model_version";
const DEPLOYED_VERSION_KEY: &str = "deployed_version";

/// Persistent change log backed by SQLite.
#[derive(Clone)]
pub struct ChangeSetStore {
    conn: Arc<Mutex<Connection>>,
}

impl ChangeSetStore {
    /// Opens (or creates) a change log at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        debug!(path = %path.display(), "opened change log");
        Ok(store)
    }

    /// Opens an in-memory change log (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS change_sets (
                id INTEGER PRIMARY KEY,
                version INTEGER NOT NULL,
                change_set TEXT NOT NULL,
                applied TEXT NOT NULL,
                committed_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft'
            );

            CREATE INDEX IF NOT EXISTS idx_change_sets_version ON change_sets(version);

            CREATE TABLE IF NOT EXISTS deployments (
                id TEXT PRIMARY KEY,
                version INTEGER NOT NULL UNIQUE,
                change_sets TEXT NOT NULL,
                deployed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS model_state (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Records one committed batch and the model version it produced.
    pub fn save_commit(
        &self,
        model_version: u64,
        change_sets: &[ModelChangeSetInfo],
    ) -> StorageResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for info in change_sets {
            tx.execute(
                "INSERT INTO change_sets (id, version, change_set, applied, committed_at, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    to_sql(info.id.as_u64()),
                    to_sql(info.version),
                    serde_json::to_string(&info.change_set)?,
                    serde_json::to_string(&info.applied)?,
                    info.committed_at.to_rfc3339(),
                    info.status.as_str(),
                ],
            )?;
        }
        set_state(&tx, MODEL_VERSION_KEY, model_version)?;
        tx.commit()?;
        debug!(model_version, count = change_sets.len(), "persisted commit");
        Ok(())
    }

    /// Records a deployment and marks its change-sets as deployed.
    pub fn save_deployment(&self, record: &DeploymentRecord) -> StorageResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let ids: Vec<u64> = record.change_sets.iter().map(|id| id.as_u64()).collect();
        tx.execute(
            "INSERT INTO deployments (id, version, change_sets, deployed_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id.to_string(),
                to_sql(record.version),
                serde_json::to_string(&ids)?,
                record.deployed_at.to_rfc3339(),
            ],
        )?;
        for id in &ids {
            tx.execute(
                "UPDATE change_sets SET status = ?1 WHERE id = ?2",
                params![ChangeSetStatus::Deployed.as_str(), to_sql(*id)],
            )?;
        }
        set_state(&tx, DEPLOYED_VERSION_KEY, record.version)?;
        tx.commit()?;
        debug!(deployed_version = record.version, count = ids.len(), "persisted deployment");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Loads the full history in replay order.
    pub fn load(&self) -> StorageResult<ChangeHistory> {
        let conn = self.lock();
        let model_version = get_state(&conn, MODEL_VERSION_KEY)?;
        let deployed_version = get_state(&conn, DEPLOYED_VERSION_KEY)?;

        let mut stmt = conn.prepare(
            "SELECT id, version, change_set, applied, committed_at, status
             FROM change_sets ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut change_sets = Vec::new();
        for row in rows {
            let (id, version, change_set, applied, committed_at, status) = row?;
            let status = ChangeSetStatus::parse(&status)
                .ok_or_else(|| StorageError::InvalidData(format!("unknown status '{status}'")))?;
            change_sets.push(ModelChangeSetInfo {
                id: ChangeSetId::new(from_sql(id)?),
                version: from_sql(version)?,
                change_set: serde_json::from_str::<ModelChangeSet>(&change_set)?,
                applied: serde_json::from_str::<AppliedChange>(&applied)?,
                committed_at: parse_time(&committed_at)?,
                status,
            });
        }

        let mut stmt = conn.prepare(
            "SELECT id, version, change_sets, deployed_at FROM deployments ORDER BY version ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut deployments = Vec::new();
        for row in rows {
            let (id, version, ids, deployed_at) = row?;
            let ids: Vec<u64> = serde_json::from_str(&ids)?;
            deployments.push(DeploymentRecord {
                id: DeploymentId::parse(&id)
                    .map_err(|e| StorageError::InvalidData(format!("invalid deployment id: {e}")))?,
                version: from_sql(version)?,
                change_sets: ids.into_iter().map(ChangeSetId::new).collect(),
                deployed_at: parse_time(&deployed_at)?,
            });
        }

        Ok(ChangeHistory {
            model_version,
            deployed_version,
            change_sets,
            deployments,
        })
    }

    /// Returns the last persisted model version (0 when empty).
    pub fn model_version(&self) -> StorageResult<u64> {
        get_state(&self.lock(), MODEL_VERSION_KEY)
    }

    /// Returns the last persisted deployed version (0 when empty).
    pub fn deployed_version(&self) -> StorageResult<u64> {
        get_state(&self.lock(), DEPLOYED_VERSION_KEY)
    }

    /// Returns the number of stored change-sets.
    pub fn change_set_count(&self) -> StorageResult<usize> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM change_sets", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn set_state(conn: &Connection, key: &str, value: u64) -> StorageResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO model_state (key, value) VALUES (?1, ?2)",
        params![key, to_sql(value)],
    )?;
    Ok(())
}

fn get_state(conn: &Connection, key: &str) -> StorageResult<u64> {
    let value: Option<i64> = conn
        .query_row(
            "SELECT value FROM model_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    value.map(from_sql).transpose().map(Option::unwrap_or_default)
}

fn to_sql(value: u64) -> i64 {
    value as i64
}

fn from_sql(value: i64) -> StorageResult<u64> {
    u64::try_from(value).map_err(|_| StorageError::InvalidData(format!("negative counter {value}")))
}

fn parse_time(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidData(format!("invalid timestamp '{raw}': {e}")))
}
