//! Axum API server binary.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use gesture_api::{create_router, logging, metrics, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    logging::init_tracing(BoxMakeWriter::new(std::io::stdout));

    info!("Starting gesture-api");

    let config = ApiConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        model = %config.model_path.display(),
        labels = %config.labels_path.display(),
        environment = %config.environment,
        "API config"
    );
    if config.is_production() && config.cors_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin in production; set CORS_ORIGINS");
    }

    // Model and labels must load before the listener exists.
    let state = AppState::load(config.clone()).map_err(|e| {
        error!("Application startup failed: {}", e);
        e
    })?;
    info!(
        feature_dim = state.inference.feature_dim(),
        labels = state.inference.labels().len(),
        "Model artifacts loaded"
    );

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics().context("Failed to install Prometheus recorder")?)
    } else {
        None
    };

    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for CTRL+C: {}", e);
        return;
    }
    info!("Received shutdown signal");
}
