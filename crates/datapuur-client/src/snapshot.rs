//! Versioned persistence of the job list.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;
use crate::job::Job;
use crate::storage::{ClientStorage, JOBS_SNAPSHOT_KEY};

/// Current snapshot schema version. Bump when [`Job`] changes shape.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized job list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub jobs: Vec<Job>,
}

impl JobSnapshot {
    pub fn new(jobs: Vec<Job>, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            jobs,
        }
    }
}

/// Save/load boundary for job snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, snapshot: &JobSnapshot) -> ClientResult<()>;

    /// Last snapshot, or `None` if nothing usable is stored.
    async fn load(&self) -> ClientResult<Option<JobSnapshot>>;
}

/// Snapshot store on top of [`ClientStorage`].
pub struct StorageSnapshotStore {
    storage: Arc<ClientStorage>,
}

impl StorageSnapshotStore {
    pub fn new(storage: Arc<ClientStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl SnapshotStore for StorageSnapshotStore {
    async fn save(&self, snapshot: &JobSnapshot) -> ClientResult<()> {
        self.storage.set_as(JOBS_SNAPSHOT_KEY, snapshot).await
    }

    async fn load(&self) -> ClientResult<Option<JobSnapshot>> {
        let Some(raw) = self.storage.get(JOBS_SNAPSHOT_KEY).await else {
            return Ok(None);
        };

        let version = raw.get("version").and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(SNAPSHOT_VERSION)) {
            tracing::warn!(
                "Ignoring job snapshot with version {:?} (expected {})",
                version,
                SNAPSHOT_VERSION
            );
            return Ok(None);
        }

        match serde_json::from_value(raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!("Ignoring undecodable job snapshot: {}", e);
                Ok(None)
            }
        }
    }
}
