// Main entry point for the crawler API server

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server_core::kernel::LiveBackend;
use server_core::registry::ConfigRegistry;
use server_core::server::{build_app, AppState};
use server_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,crawl_session=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LLM Crawler API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let registry = ConfigRegistry::builtin();
    tracing::info!("{} predefined configurations available", registry.len());

    // Cancelled on shutdown so in-flight sessions stop at their next delay
    let shutdown = CancellationToken::new();

    let state = AppState {
        registry: Arc::new(registry),
        backend: Arc::new(LiveBackend::new(&config)),
        shutdown: shutdown.clone(),
    };
    let app = build_app(state, config.api_key.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal(sessions: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::info!("Shutdown signal received, cancelling in-flight sessions");
    sessions.cancel();
}
