//! Remote processing-jobs API.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::ClientResult;
use crate::job::{Job, JobId, StartJobOptions};
use crate::rest::RestClient;

/// Path of the jobs collection on the web tier.
pub const JOBS_PATH: &str = "/api/processing-jobs";

/// Operations the job store needs from the backend.
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Create a job for `schema_id` and return the server record.
    async fn create_job(&self, schema_id: &str, options: &StartJobOptions) -> ClientResult<Job>;

    /// Full job list.
    async fn list_jobs(&self) -> ClientResult<Vec<Job>>;

    /// Cancel (delete) a job.
    async fn cancel_job(&self, job_id: &JobId) -> ClientResult<()>;
}

#[derive(Serialize)]
struct CreateJobBody<'a> {
    schema_id: &'a str,
    #[serde(flatten)]
    options: &'a StartJobOptions,
}

/// [`JobsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpJobsApi {
    rest: RestClient,
}

impl HttpJobsApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl JobsApi for HttpJobsApi {
    #[instrument(skip(self, options), fields(job_type = ?options.job_type))]
    async fn create_job(&self, schema_id: &str, options: &StartJobOptions) -> ClientResult<Job> {
        debug!("Creating job at {}", self.rest.url(JOBS_PATH));
        let request = self
            .rest
            .post(JOBS_PATH)
            .await?
            .json(&CreateJobBody { schema_id, options });
        let value: Value = self.rest.send_json(request).await?;
        Ok(Job::from_backend(value)?)
    }

    #[instrument(skip(self))]
    async fn list_jobs(&self) -> ClientResult<Vec<Job>> {
        let request = self.rest.get(JOBS_PATH).await?;
        let values: Vec<Value> = self.rest.send_json(request).await?;
        Ok(Job::from_backend_list(values))
    }

    #[instrument(skip(self))]
    async fn cancel_job(&self, job_id: &JobId) -> ClientResult<()> {
        let url = self.rest.item_url(JOBS_PATH, job_id.as_str())?;
        debug!("Cancelling job at {}", url);
        let request = self.rest.request(Method::DELETE, url).await?;
        self.rest.send_empty(request).await
    }
}
