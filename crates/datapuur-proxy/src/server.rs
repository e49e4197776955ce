//! Axum server setup and routing.

use std::sync::Arc;

use axum::{
    Router,
    http::Uri,
    routing::{any, get},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::error::ApiError;
use crate::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api::health::health))
        // Processing jobs
        .route(
            "/processing-jobs",
            get(api::jobs::list_jobs).post(api::jobs::create_job),
        )
        .route(
            "/processing-jobs/{id}",
            get(api::jobs::get_job).delete(api::jobs::cancel_job),
        )
        // Datasets and transformations
        .route("/datapuur-ai/{*path}", any(api::datapuur_ai::relay))
        // Administration
        .route(
            "/admin/users",
            get(api::admin::list_users).post(api::admin::create_user),
        )
        .route(
            "/admin/users/{id}",
            get(api::admin::user)
                .put(api::admin::user)
                .delete(api::admin::user),
        )
        .route(
            "/admin/roles",
            get(api::admin::list_roles).post(api::admin::create_role),
        )
        .route(
            "/admin/roles/{id}",
            get(api::admin::role)
                .put(api::admin::role)
                .delete(api::admin::role),
        )
        // Dashboards
        .route(
            "/static_dashboards/{dashboard}",
            get(api::dashboards::get_dashboard),
        );

    Router::new()
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
