//! Application setup and router construction.

use std::sync::Arc;

use axum::{
    extract::Extension,
    middleware,
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::CrawlBackend;
use crate::registry::ConfigRegistry;
use crate::security::SecretString;
use crate::server::middleware::require_api_key;
use crate::server::routes::{configs_handler, crawl_handler, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConfigRegistry>,
    pub backend: Arc<dyn CrawlBackend>,
    /// Cancelled on shutdown; sessions derive child tokens from it
    pub shutdown: CancellationToken,
}

/// Build the Axum application router.
///
/// `/crawl` and `/configs` sit behind the API-key middleware; `/health`
/// stays open for probes.
pub fn build_app(state: AppState, api_key: SecretString) -> Router {
    let protected = Router::new()
        .route("/crawl", post(crawl_handler))
        .route("/configs", get(configs_handler))
        .layer(middleware::from_fn(move |request, next| {
            require_api_key(api_key.clone(), request, next)
        }));

    Router::new()
        .merge(protected)
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
