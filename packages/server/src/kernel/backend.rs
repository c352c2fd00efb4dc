//! Backend trait wiring sessions to their production collaborators.
//!
//! Route handlers depend on [`CrawlBackend`] rather than concrete clients,
//! so handler tests can substitute a stub without network access.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crawl_session::{CrawlConfig, SessionError, SessionResult, SessionRunner, UrlGuard};

use crate::config::Config;
use crate::kernel::fetcher::RenderedPageFetcher;
use crate::kernel::llm::LlmExtractor;
use crate::security::SecretString;

/// Runs one crawl session for an already-resolved configuration.
#[async_trait]
pub trait CrawlBackend: Send + Sync {
    async fn run_session(
        &self,
        config: &CrawlConfig,
        cancel: CancellationToken,
    ) -> Result<SessionResult, SessionError>;
}

/// Production backend: builds the LLM extractor and page fetcher per
/// session and drives them through a [`SessionRunner`].
///
/// Collaborators are created inside `run_session` and dropped with it, so
/// usage counters and HTTP clients never leak across sessions.
pub struct LiveBackend {
    llm_api_key: SecretString,
    llm_base_url: String,
    guard: UrlGuard,
}

impl LiveBackend {
    /// Build the backend from server configuration.
    pub fn new(config: &Config) -> Self {
        let mut guard = UrlGuard::new();
        for host in &config.allow_hosts {
            guard = guard.allow_host(host.clone());
        }
        Self {
            llm_api_key: config.llm_api_key.clone(),
            llm_base_url: config.llm_base_url.clone(),
            guard,
        }
    }
}

#[async_trait]
impl CrawlBackend for LiveBackend {
    async fn run_session(
        &self,
        config: &CrawlConfig,
        cancel: CancellationToken,
    ) -> Result<SessionResult, SessionError> {
        let extractor = Arc::new(LlmExtractor::new(
            config.llm.clone(),
            self.llm_api_key.clone(),
            self.llm_base_url.clone(),
        ));
        let fetcher = RenderedPageFetcher::new(config, Arc::clone(&extractor))?;

        SessionRunner::new(fetcher, extractor)
            .with_guard(self.guard.clone())
            .with_cancellation(cancel)
            .run(config)
            .await
    }
}
