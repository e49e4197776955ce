//! Response bodies produced by the proxy itself.
//!
//! Everything else is relayed from the backend untouched.

use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status (always "ok" if responding).
    pub status: String,
    /// Proxy version.
    pub version: String,
    /// Whether mock dashboards are served to anonymous requests.
    pub static_export: bool,
}

impl HealthResponse {
    pub fn ok(static_export: bool) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            static_export,
        }
    }
}
