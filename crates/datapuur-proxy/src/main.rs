//! DataPuur proxy binary entry point.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datapuur_proxy::{AppState, ProxyConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datapuur_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ProxyConfig::from_env()?;
    let bind_addr = config.bind_address;
    tracing::info!(
        backend = %config.backend_url,
        static_export = config.static_export,
        "Loaded proxy configuration"
    );

    let state = Arc::new(AppState::with_config(config));
    let app = create_router(state);

    tracing::info!("Starting DataPuur proxy at http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
