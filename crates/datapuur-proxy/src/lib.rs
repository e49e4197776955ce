//! DataPuur route proxy
//!
//! Same-origin HTTP front for the DataPuur console. Every `/api/...` route
//! checks for an `Authorization` header, forwards method, query, body and
//! credentials to the analytics backend, and relays the backend's status and
//! JSON body unchanged.
//!
//! - Missing credentials produce `401 {"detail": "Authentication required"}`
//! - An unreachable backend produces 502, other failures 500
//! - Summary dashboards fall back to bundled mock JSON in static-export mode
//!   and the `factory` dashboard is reshaped for the chart components
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use datapuur_proxy::{AppState, ProxyConfig, create_router};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ProxyConfig::default().with_backend_url("http://127.0.0.1:8000");
//!     let state = Arc::new(AppState::with_config(config.clone()));
//!
//!     let app = create_router(state);
//!     let listener = tokio::net::TcpListener::bind(config.bind_address).await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod api;
pub mod dashboard;
pub mod dto;
pub mod error;
pub mod proxy;
pub mod reshape;
pub mod server;
pub mod state;

pub use dashboard::Dashboard;
pub use dto::HealthResponse;
pub use error::ApiError;
pub use proxy::{Forward, Relayed};
pub use server::create_router;
pub use state::{AppState, ConfigError, ProxyConfig};
