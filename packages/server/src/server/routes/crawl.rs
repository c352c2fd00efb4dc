//! POST /crawl, runs one crawl session.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crawl_session::{CrawlConfig, ExtractedRecord, SessionError};

use crate::server::app::AppState;

/// Crawl request: a registry name or an inline configuration.
#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    pub config_name: Option<String>,
    pub custom_config: Option<CrawlConfig>,
}

/// Extracted items plus run statistics.
#[derive(Debug, Serialize)]
pub struct CrawlResponse {
    pub items: Vec<ExtractedRecord>,
    pub stats: CrawlStats,
}

#[derive(Debug, Serialize)]
pub struct CrawlStats {
    pub total_items: usize,
    pub pages_crawled: u32,
    pub llm_usage: serde_json::Value,
}

/// Crawl a website using either a predefined configuration or a custom
/// configuration supplied in the request body.
pub async fn crawl_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Result<Json<CrawlResponse>, ApiError> {
    let config = resolve_config(&state, request)?;
    info!(base_url = %config.base_url, "crawl requested");

    let result = state
        .backend
        .run_session(&config, state.shutdown.child_token())
        .await?;

    Ok(Json(CrawlResponse {
        stats: CrawlStats {
            total_items: result.total_items,
            pages_crawled: result.pages_crawled,
            llm_usage: result.llm_usage,
        },
        items: result.records,
    }))
}

/// Resolve the request to a config. A provided `config_name` wins over
/// `custom_config`; an unknown name is an error even when a custom config
/// is also present.
fn resolve_config(state: &AppState, request: CrawlRequest) -> Result<CrawlConfig, ApiError> {
    if let Some(name) = request.config_name {
        return state
            .registry
            .get(&name)
            .map(|entry| entry.config.clone())
            .ok_or(ApiError::UnknownConfig(name));
    }
    request.custom_config.ok_or(ApiError::MissingConfig)
}

/// Errors surfaced by the crawl route.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Neither config_name nor custom_config was provided
    #[error("either config_name or custom_config must be provided")]
    MissingConfig,

    /// config_name did not resolve in the registry
    #[error("unknown configuration: {0}")]
    UnknownConfig(String),

    /// The session itself failed
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingConfig | Self::UnknownConfig(_) => StatusCode::BAD_REQUEST,
            Self::Session(SessionError::Config(_)) => StatusCode::BAD_REQUEST,
            Self::Session(cause @ SessionError::Fetch { .. }) => {
                error!(error = %cause, "crawl session failed");
                StatusCode::BAD_GATEWAY
            }
            Self::Session(SessionError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
