//! GET /health, liveness probe.

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    configs: usize,
}

/// Health check endpoint. No downstream dependencies are probed; the LLM
/// endpoint is only reachable per-session, so this reports process health
/// and registry size.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            configs: state.registry.len(),
        }),
    )
}
