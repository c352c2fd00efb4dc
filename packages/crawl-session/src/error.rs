//! Typed errors for crawl sessions.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that abort an entire crawl session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration was invalid; surfaced before the first fetch.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The page fetcher failed mid-session. The whole run is aborted;
    /// results accumulated up to `page` are discarded.
    #[error("fetch failed on page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: FetchError,
    },

    /// The session was cancelled at a suspension point.
    #[error("session cancelled")]
    Cancelled,
}

impl SessionError {
    /// The page number a mid-session fetch failure occurred on, if any.
    pub fn failed_page(&self) -> Option<u32> {
        match self {
            Self::Fetch { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// Errors that can occur while fetching and extracting a single page.
///
/// "No results on this page" is NOT an error; fetchers report it through
/// [`PageFetch::no_results_found`](crate::traits::fetcher::PageFetch).
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Navigation timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Page URL could not be constructed or parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The extraction backend failed
    #[error("extraction error: {0}")]
    Extraction(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The extraction backend answered, but with an unusable payload
    #[error("malformed extraction payload: {reason}")]
    MalformedPayload { reason: String },
}

/// Errors raised by configuration validation, before any fetch happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Base URL did not parse
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    /// Base URL was rejected by the safety guard
    #[error("unsafe base URL: {0}")]
    UnsafeBaseUrl(#[from] UrlGuardError),

    /// A required configuration value was empty
    #[error("missing config value: {field}")]
    MissingValue { field: &'static str },

    /// A numeric configuration value was out of range
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// URL safety violations, primarily SSRF protection.
#[derive(Debug, Error)]
pub enum UrlGuardError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, internal IPs)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for config validation.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL guard checks.
pub type UrlGuardResult<T> = std::result::Result<T, UrlGuardError>;
