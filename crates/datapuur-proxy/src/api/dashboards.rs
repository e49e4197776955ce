//! Summary dashboard endpoint.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::dashboard::Dashboard;
use crate::error::ApiError;
use crate::proxy::{self, Forward};
use crate::state::AppState;

/// GET /api/static_dashboards/:dashboard - Dashboard summary.
///
/// Unauthenticated requests get the bundled mock in static-export mode and
/// 401 otherwise. Backend errors are relayed without reshaping.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let dashboard = Dashboard::from_slug(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown dashboard: {name}")))?;

    if proxy::authorization(&headers).is_none() && state.config.static_export {
        debug!("Serving mock {} dashboard", dashboard.slug());
        return Ok(Json(dashboard.mock()?).into_response());
    }

    let forward = Forward::new(
        Method::GET,
        dashboard.backend_path(),
        query,
        &headers,
        Bytes::new(),
    )?;
    let mut relayed = proxy::send(&state, forward).await?;
    if relayed.is_success() {
        relayed.body = relayed.body.map(|body| dashboard.reshape(body));
    }
    Ok(relayed.into_response())
}
