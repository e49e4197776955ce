//! Processing job endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method},
};

use crate::error::ApiError;
use crate::proxy::{self, Forward, Relayed};
use crate::state::AppState;

const JOBS_PATH: &str = "/api/processing-jobs";

/// GET /api/processing-jobs - List jobs.
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Relayed, ApiError> {
    proxy::relay(&state, Method::GET, JOBS_PATH, query, &headers, Bytes::new()).await
}

/// POST /api/processing-jobs - Start a job.
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Relayed, ApiError> {
    proxy::relay(&state, Method::POST, JOBS_PATH, None, &headers, body).await
}

/// GET /api/processing-jobs/:id - Job details.
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Relayed, ApiError> {
    let forward =
        Forward::new(Method::GET, JOBS_PATH, None, &headers, Bytes::new())?.with_segment(&id)?;
    proxy::send(&state, forward).await
}

/// DELETE /api/processing-jobs/:id - Cancel a job.
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Relayed, ApiError> {
    let forward =
        Forward::new(Method::DELETE, JOBS_PATH, None, &headers, Bytes::new())?.with_segment(&id)?;
    proxy::send(&state, forward).await
}
