//! Client-side tracking of background processing jobs.
//!
//! The [`JobStore`] keeps the list of jobs the user cares about, mirrors it to
//! a [`SnapshotStore`], and reconciles it with the backend on a fixed poll
//! period while any job is pending or running.
//!
//! Records pass through these states:
//!
//! ```text
//!   start_job ──→ temp-<millis> (pending) ──POST ok──→ server record ──poll──→ terminal
//!                        │                                                    │
//!                   POST failed / 2 min unconfirmed                 5 min after updated_at
//!                        ↓                                                    ↓
//!                     removed                                              evicted
//! ```
//!
//! The one-active-job-per-schema rule is checked only against local state.
//! Another client can still start a duplicate job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::ClientResult;
use crate::job::{Job, JobId, JobStatus, JobType, StartJobOptions};
use crate::job_api::JobsApi;
use crate::notice::{Notice, Notifier};
use crate::poller::{PollControl, Poller};
use crate::snapshot::{JobSnapshot, SnapshotStore};

/// Timing rules for the job store.
#[derive(Debug, Clone)]
pub struct JobStoreConfig {
    /// Period of the status poll while jobs are active.
    pub poll_interval: Duration,
    /// How long an unconfirmed placeholder survives before it is treated as
    /// a failed creation.
    pub temp_job_ttl: chrono::Duration,
    /// How long a finished job stays visible after its last update.
    pub terminal_retention: chrono::Duration,
}

impl Default for JobStoreConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            temp_job_ttl: chrono::Duration::minutes(2),
            terminal_retention: chrono::Duration::minutes(5),
        }
    }
}

/// Result of [`JobStore::refresh_jobs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// State was reconciled with the backend.
    Updated { jobs: usize, active: usize },
    /// Another refresh was already in flight.
    Skipped,
}

/// Tracks background jobs and keeps them in sync with the backend.
pub struct JobStore {
    api: Arc<dyn JobsApi>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
    config: JobStoreConfig,
    jobs: RwLock<Vec<Job>>,
    refreshing: AtomicBool,
    poller: Poller,
}

impl JobStore {
    pub fn new(api: Arc<dyn JobsApi>, clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        let config = JobStoreConfig::default();
        Self {
            api,
            clock,
            notifier,
            snapshots: None,
            poller: Poller::new(config.poll_interval),
            config,
            jobs: RwLock::new(Vec::new()),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Persist every state change through `snapshots`.
    pub fn with_snapshots(mut self, snapshots: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn with_config(mut self, config: JobStoreConfig) -> Self {
        self.poller = Poller::new(config.poll_interval);
        self.config = config;
        self
    }

    pub fn config(&self) -> &JobStoreConfig {
        &self.config
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Every tracked job, in insertion order.
    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    pub async fn get(&self, job_id: &JobId) -> Option<Job> {
        self.jobs.read().await.iter().find(|j| &j.id == job_id).cloned()
    }

    pub async fn active_jobs(&self) -> Vec<Job> {
        self.jobs
            .read()
            .await
            .iter()
            .filter(|j| j.is_active())
            .cloned()
            .collect()
    }

    pub async fn has_active_jobs(&self) -> bool {
        self.jobs.read().await.iter().any(Job::is_active)
    }

    /// The pending/running job for `schema_id`, if any.
    pub async fn active_job_for(&self, schema_id: &str) -> Option<Job> {
        self.jobs
            .read()
            .await
            .iter()
            .find(|j| j.schema_id == schema_id && j.is_active())
            .cloned()
    }

    /// Jobs that belong in the active view right now, newest first.
    ///
    /// Finished jobs drop out once they are older than the retention window,
    /// even if no refresh has happened since.
    pub async fn visible_jobs(&self) -> Vec<Job> {
        let now = self.clock.now();
        let mut jobs: Vec<_> = self
            .jobs
            .read()
            .await
            .iter()
            .filter(|j| !self.is_expired(j, now))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    // ─── Commands ───────────────────────────────────────────────────

    /// Start a job for `schema_id`.
    ///
    /// Returns `Ok(None)` without contacting the backend when a job is
    /// already active for that schema.
    pub async fn start_job(
        self: &Arc<Self>,
        schema_id: &str,
        options: StartJobOptions,
    ) -> ClientResult<Option<Job>> {
        let now = self.clock.now();

        let placeholder = {
            let mut jobs = self.jobs.write().await;
            if let Some(active) = jobs
                .iter()
                .find(|j| j.schema_id == schema_id && j.is_active())
            {
                info!(
                    "Job {} already active for schema {}, not starting another",
                    active.id, schema_id
                );
                self.notifier.notify(Notice::warning(
                    "Job already running",
                    format!(
                        "{} is already in progress for this dataset ({}% complete)",
                        active.job_type.label(),
                        active.progress
                    ),
                ));
                return Ok(None);
            }

            let mut placeholder = Job::placeholder(schema_id, &options, now);
            let mut stamp = now;
            while jobs.iter().any(|j| j.id == placeholder.id) {
                stamp += chrono::Duration::milliseconds(1);
                placeholder.id = JobId::temporary(stamp);
            }
            jobs.push(placeholder.clone());
            placeholder
        };
        self.persist().await;

        match self.api.create_job(schema_id, &options).await {
            Ok(job) => {
                {
                    let mut jobs = self.jobs.write().await;
                    jobs.retain(|j| j.id != placeholder.id && j.id != job.id);
                    jobs.push(job.clone());
                }
                self.persist().await;
                self.ensure_polling();

                info!("Job {} started for schema {}", job.id, schema_id);
                self.notifier.notify(Notice::success(
                    "Job started",
                    format!("{} started", job.job_type.label()),
                ));
                Ok(Some(job))
            }
            Err(e) => {
                self.jobs
                    .write()
                    .await
                    .retain(|j| j.id != placeholder.id);
                self.persist().await;

                warn!("Failed to start job for schema {}: {}", schema_id, e);
                self.notifier
                    .notify(Notice::error("Failed to start job", e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn start_load_data_job(self: &Arc<Self>, schema_id: &str) -> ClientResult<Option<Job>> {
        self.start_job(schema_id, StartJobOptions::new(JobType::LoadData))
            .await
    }

    pub async fn start_clean_data_job(
        self: &Arc<Self>,
        schema_id: &str,
        config: serde_json::Value,
    ) -> ClientResult<Option<Job>> {
        self.start_job(
            schema_id,
            StartJobOptions::new(JobType::CleanData).with_config(config),
        )
        .await
    }

    pub async fn start_transform_job(
        self: &Arc<Self>,
        schema_id: &str,
        transformation_id: &str,
    ) -> ClientResult<Option<Job>> {
        self.start_job(
            schema_id,
            StartJobOptions::new(JobType::Transform)
                .with_config(serde_json::json!({ "transformation_id": transformation_id })),
        )
        .await
    }

    pub async fn start_graph_job(
        self: &Arc<Self>,
        schema_id: &str,
        options: serde_json::Value,
    ) -> ClientResult<Option<Job>> {
        self.start_job(
            schema_id,
            StartJobOptions::new(JobType::GenerateGraph).with_config(options),
        )
        .await
    }

    /// Reconcile local state with the backend's job list.
    pub async fn refresh_jobs(&self) -> ClientResult<RefreshOutcome> {
        if self.refreshing.swap(true, Ordering::AcqRel) {
            debug!("Refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        }
        let _guard = RefreshGuard(&self.refreshing);

        let server_jobs = match self.api.list_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!("Failed to refresh jobs: {}", e);
                return Err(e);
            }
        };

        let now = self.clock.now();
        let outcome = {
            let mut jobs = self.jobs.write().await;
            *jobs = merge_jobs(&jobs, server_jobs, now, &self.config);
            RefreshOutcome::Updated {
                jobs: jobs.len(),
                active: jobs.iter().filter(|j| j.is_active()).count(),
            }
        };
        self.persist().await;
        Ok(outcome)
    }

    /// Cancel a job.
    ///
    /// A job the backend no longer knows is dropped locally and reported as
    /// removed rather than as an error.
    pub async fn cancel_job(&self, job_id: &JobId) -> ClientResult<()> {
        match self.api.cancel_job(job_id).await {
            Ok(()) => {
                let now = self.clock.now();
                {
                    let mut jobs = self.jobs.write().await;
                    if let Some(job) = jobs.iter_mut().find(|j| &j.id == job_id) {
                        job.status = JobStatus::Cancelled;
                        job.message = "Job cancelled".to_string();
                        job.updated_at = now;
                    }
                }
                self.persist().await;

                info!("Job {} cancelled", job_id);
                self.notifier
                    .notify(Notice::info("Job cancelled", "The job has been cancelled"));

                if let Err(e) = self.refresh_jobs().await {
                    warn!("Refresh after cancelling {} failed: {}", job_id, e);
                }
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                self.remove_local(job_id).await;
                info!("Job {} not found on backend, removed locally", job_id);
                self.notifier.notify(Notice::info(
                    "Job Removed",
                    "The job no longer exists on the server and was removed",
                ));
                Ok(())
            }
            Err(e) => {
                if job_id.is_temporary() && e.is_network() {
                    self.remove_local(job_id).await;
                }
                warn!("Failed to cancel job {}: {}", job_id, e);
                self.notifier
                    .notify(Notice::error("Failed to cancel job", e.user_message()));
                Err(e)
            }
        }
    }

    /// Drop every finished job from local state. Returns how many were removed.
    pub async fn clear_completed(&self) -> usize {
        let removed = {
            let mut jobs = self.jobs.write().await;
            let before = jobs.len();
            jobs.retain(Job::is_active);
            before - jobs.len()
        };
        if removed > 0 {
            self.persist().await;
        }
        removed
    }

    /// Load the last snapshot and resume polling if it holds active jobs.
    ///
    /// Returns the number of jobs restored.
    pub async fn restore(self: &Arc<Self>) -> ClientResult<usize> {
        let Some(snapshots) = &self.snapshots else {
            return Ok(0);
        };
        let Some(snapshot) = snapshots.load().await? else {
            return Ok(0);
        };

        let now = self.clock.now();
        let restored = {
            let mut jobs = self.jobs.write().await;
            *jobs = snapshot
                .jobs
                .into_iter()
                .filter(|j| !self.is_expired(j, now))
                .collect();
            jobs.len()
        };

        info!("Restored {} job(s) from snapshot", restored);
        if self.has_active_jobs().await {
            self.ensure_polling();
        }
        Ok(restored)
    }

    /// Start polling unless a poll loop is already running.
    pub fn ensure_polling(self: &Arc<Self>) {
        let store: Weak<Self> = Arc::downgrade(self);
        let spawned = self.poller.start(move || {
            let store = store.clone();
            async move {
                let Some(store) = store.upgrade() else {
                    return PollControl::Stop;
                };
                // Errors are logged inside refresh_jobs; keep polling.
                let _ = store.refresh_jobs().await;
                if store.has_active_jobs().await {
                    PollControl::Continue
                } else {
                    PollControl::Stop
                }
            }
        });
        if spawned {
            debug!("Started job polling every {:?}", self.poller.period());
        }
    }

    pub fn stop_polling(&self) {
        self.poller.stop();
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn is_expired(&self, job: &Job, now: DateTime<Utc>) -> bool {
        is_expired(job, now, &self.config)
    }

    async fn remove_local(&self, job_id: &JobId) {
        self.jobs.write().await.retain(|j| &j.id != job_id);
        self.persist().await;
    }

    async fn persist(&self) {
        let Some(snapshots) = &self.snapshots else {
            return;
        };
        let snapshot = JobSnapshot::new(self.jobs.read().await.clone(), self.clock.now());
        if let Err(e) = snapshots.save(&snapshot).await {
            warn!("Failed to persist job snapshot: {}", e);
        }
    }
}

struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn is_expired(job: &Job, now: DateTime<Utc>, config: &JobStoreConfig) -> bool {
    if job.id.is_temporary() {
        return now - job.created_at >= config.temp_job_ttl;
    }
    job.is_terminal() && now - job.updated_at >= config.terminal_retention
}

/// Merge the backend's list with local records it does not know about yet.
///
/// Keeps placeholders still waiting for confirmation and recently finished
/// jobs the backend already dropped, so the view does not flicker.
fn merge_jobs(
    local: &[Job],
    server: Vec<Job>,
    now: DateTime<Utc>,
    config: &JobStoreConfig,
) -> Vec<Job> {
    let server_ids: FxHashSet<JobId> = server.iter().map(|j| j.id.clone()).collect();
    let server_active: FxHashSet<(String, JobType)> = server
        .iter()
        .filter(|j| j.is_active())
        .map(|j| (j.schema_id.clone(), j.job_type))
        .collect();

    let mut merged: Vec<Job> = server
        .into_iter()
        .filter(|j| !is_expired(j, now, config))
        .collect();

    for job in local {
        if server_ids.contains(&job.id) || is_expired(job, now, config) {
            continue;
        }
        if job.id.is_temporary() {
            // The backend already reports the job this placeholder stands for.
            if !server_active.contains(&(job.schema_id.clone(), job.job_type)) {
                merged.push(job.clone());
            }
        } else if job.is_terminal() {
            merged.push(job.clone());
        }
    }
    merged
}
