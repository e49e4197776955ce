//! Error types for the proxy.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// API error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No `Authorization` header on a protected route.
    #[error("Authentication required")]
    Unauthorized,

    /// The request cannot be forwarded as given.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend could not be reached.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, Some("bad_request")),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, Some("not_found")),
            ApiError::BackendUnavailable(_) => (StatusCode::BAD_GATEWAY, Some("backend_unavailable")),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, Some("internal_error")),
        };

        let detail = match &self {
            ApiError::Unauthorized => self.to_string(),
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::BackendUnavailable(msg)
            | ApiError::Internal(msg) => msg.clone(),
        };

        let body = Json(ErrorResponse {
            error: error_type,
            detail,
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ApiError::BackendUnavailable(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}
