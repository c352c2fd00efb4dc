//! API-key authentication middleware.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::security::SecretString;

/// Header clients present their key in
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests whose X-API-Key header does not match the configured
/// key. Runs before config resolution; the session core never sees an
/// unauthenticated request.
pub async fn require_api_key(expected: SecretString, request: Request, next: Next) -> Response {
    if key_matches(&request, &expected) {
        next.run(request).await
    } else {
        debug!("rejected request with missing or invalid API key");
        (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "invalid API key" })),
        )
            .into_response()
    }
}

fn key_matches(request: &Request, expected: &SecretString) -> bool {
    request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|provided| provided == expected.expose())
        .unwrap_or(false)
}
