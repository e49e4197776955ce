//! The backend hop shared by every forwarded route.

use axum::{
    Json,
    body::Bytes,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use reqwest::Url;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// An inbound request reduced to what the backend needs.
#[derive(Debug, Clone)]
pub struct Forward {
    pub method: Method,
    /// Fixed backend route, starting with `/api/`.
    pub path: String,
    /// Caller-supplied segments appended to `path`, each encoded on its own.
    pub segments: Vec<String>,
    pub query: Option<String>,
    pub authorization: HeaderValue,
    pub body: Bytes,
}

impl Forward {
    /// Build a forward for a protected route, rejecting requests without
    /// credentials.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        query: Option<String>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Self, ApiError> {
        let authorization = authorization(headers).ok_or(ApiError::Unauthorized)?;
        Ok(Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query,
            authorization,
            body,
        })
    }

    /// Append one caller-supplied id. `/`, `?` and `%` inside it stay part
    /// of the segment on the backend URL.
    pub fn with_segment(mut self, segment: &str) -> Result<Self, ApiError> {
        check_segment(segment)?;
        self.segments.push(segment.to_string());
        Ok(self)
    }

    /// Append a caller-supplied sub-path, one segment per `/`. Empty
    /// segments are dropped.
    pub fn with_tail(mut self, tail: &str) -> Result<Self, ApiError> {
        for segment in tail.split('/').filter(|s| !s.is_empty()) {
            check_segment(segment)?;
            self.segments.push(segment.to_string());
        }
        Ok(self)
    }

    /// Backend URL: fixed route, encoded segments, then the raw query.
    pub fn url(&self, state: &AppState) -> Result<Url, ApiError> {
        let mut url = Url::parse(&state.backend_url(&self.path))
            .map_err(|e| ApiError::Internal(format!("Invalid backend URL: {e}")))?;
        if !self.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| ApiError::Internal("Backend URL cannot carry a path".to_string()))?
                .pop_if_empty()
                .extend(&self.segments);
        }
        url.set_query(self.query.as_deref().filter(|q| !q.is_empty()));
        Ok(url)
    }
}

/// Dot segments would climb out of the route once the backend resolves them.
fn check_segment(segment: &str) -> Result<(), ApiError> {
    match segment {
        "" | "." | ".." => Err(ApiError::BadRequest(format!(
            "Invalid path segment {segment:?}"
        ))),
        _ => Ok(()),
    }
}

/// The inbound `Authorization` header, if present and non-empty.
pub fn authorization(headers: &HeaderMap) -> Option<HeaderValue> {
    headers
        .get(header::AUTHORIZATION)
        .filter(|v| !v.as_bytes().iter().all(u8::is_ascii_whitespace))
        .cloned()
}

/// The backend's answer, relayed as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    /// `None` when the backend sent no body.
    pub body: Option<Value>,
}

impl Relayed {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

/// Send `forward` to the backend and collect its status and JSON body.
pub async fn send(state: &AppState, forward: Forward) -> Result<Relayed, ApiError> {
    let url = forward.url(state)?;
    debug!("Forwarding {} {}", forward.method, url);

    let mut request = state
        .http
        .request(forward.method.clone(), url.clone())
        .header(header::AUTHORIZATION, forward.authorization);
    if !forward.body.is_empty() {
        request = request
            .header(header::CONTENT_TYPE, "application/json")
            .body(forward.body);
    }

    let response = request.send().await.map_err(|e| {
        warn!("Backend request {} {} failed: {}", forward.method, url, e);
        ApiError::from(e)
    })?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        debug!("Backend answered {} for {} {}", status, forward.method, url);
    }

    Ok(Relayed {
        status,
        body: parse_body(&text),
    })
}

/// Authenticate, forward and relay in one step.
pub async fn relay(
    state: &AppState,
    method: Method,
    path: impl Into<String>,
    query: Option<String>,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Relayed, ApiError> {
    let forward = Forward::new(method, path, query, headers, body)?;
    send(state, forward).await
}

/// JSON bodies pass through; anything else is wrapped as `{"detail": text}`.
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| json!({ "detail": text.trim() })))
}
