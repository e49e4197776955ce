//! User and role administration endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method},
};

use crate::error::ApiError;
use crate::proxy::{self, Forward, Relayed};
use crate::state::AppState;

const USERS_PATH: &str = "/api/admin/users";
const ROLES_PATH: &str = "/api/admin/roles";

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Relayed, ApiError> {
    proxy::relay(&state, Method::GET, USERS_PATH, None, &headers, Bytes::new()).await
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Relayed, ApiError> {
    proxy::relay(&state, Method::POST, USERS_PATH, None, &headers, body).await
}

/// GET, PUT or DELETE /api/admin/users/:id
pub async fn user(
    State(state): State<Arc<AppState>>,
    method: Method,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Relayed, ApiError> {
    let forward = Forward::new(method, USERS_PATH, None, &headers, body)?.with_segment(&id)?;
    proxy::send(&state, forward).await
}

/// GET /api/admin/roles
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Relayed, ApiError> {
    proxy::relay(&state, Method::GET, ROLES_PATH, None, &headers, Bytes::new()).await
}

/// POST /api/admin/roles
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Relayed, ApiError> {
    proxy::relay(&state, Method::POST, ROLES_PATH, None, &headers, body).await
}

/// GET, PUT or DELETE /api/admin/roles/:id
pub async fn role(
    State(state): State<Arc<AppState>>,
    method: Method,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Relayed, ApiError> {
    let forward = Forward::new(method, ROLES_PATH, None, &headers, body)?.with_segment(&id)?;
    proxy::send(&state, forward).await
}
