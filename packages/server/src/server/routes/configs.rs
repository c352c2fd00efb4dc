//! GET /configs, lists predefined configurations.

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct ConfigList {
    pub configs: Vec<ConfigSummary>,
}

#[derive(Serialize)]
pub struct ConfigSummary {
    pub name: String,
    pub description: String,
}

/// List all available predefined configurations.
pub async fn configs_handler(Extension(state): Extension<AppState>) -> Json<ConfigList> {
    let configs = state
        .registry
        .iter()
        .map(|(name, entry)| ConfigSummary {
            name: name.to_string(),
            description: entry.description.clone(),
        })
        .collect();
    Json(ConfigList { configs })
}
