//! View model for the floating job card.

use serde::Serialize;

use crate::job::{Job, JobId, JobStatus};
use crate::job_store::JobStore;

/// One row of the job card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCardEntry {
    pub id: JobId,
    pub title: String,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    /// Whether a cancel button is offered.
    pub cancellable: bool,
}

impl From<&Job> for JobCardEntry {
    fn from(job: &Job) -> Self {
        let message = match (&job.error, job.status) {
            (Some(error), JobStatus::Failed) => error.clone(),
            _ => job.message.clone(),
        };
        Self {
            id: job.id.clone(),
            title: job.job_type.label().to_string(),
            status: job.status,
            progress: job.progress,
            message,
            cancellable: job.is_active(),
        }
    }
}

/// Rows currently shown on the job card, newest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobCard {
    pub entries: Vec<JobCardEntry>,
}

impl JobCard {
    pub async fn from_store(store: &JobStore) -> Self {
        let entries = store.visible_jobs().await.iter().map(JobCardEntry::from).collect();
        Self { entries }
    }

    /// Whether the card should be rendered at all.
    pub fn is_visible(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.cancellable).count()
    }
}
