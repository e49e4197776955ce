//! Dataset and transformation endpoints, forwarded wholesale.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method},
};

use crate::error::ApiError;
use crate::proxy::{self, Forward, Relayed};
use crate::state::AppState;

const AI_PATH: &str = "/api/datapuur-ai";

/// ANY /api/datapuur-ai/*path
pub async fn relay(
    State(state): State<Arc<AppState>>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Relayed, ApiError> {
    let forward = Forward::new(method, AI_PATH, query, &headers, body)?.with_tail(&path)?;
    proxy::send(&state, forward).await
}
