//! The pagination loop: drives the page fetcher, dedups, decides when to
//! stop, and assembles the session result.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Result, SessionError};
use crate::session::dedup::SeenKeys;
use crate::traits::{fetcher::PageFetcher, usage::UsageCollector};
use crate::types::{config::CrawlConfig, record::ExtractedRecord, session::SessionResult};
use crate::url_guard::UrlGuard;

/// Runs crawl sessions against a page fetcher and usage collector.
///
/// One `run` call is one session: pages are fetched strictly in order, each
/// page's records are deduplicated against everything accepted so far, and
/// the loop stops on the first of three independent signals: the page's
/// no-results marker, a page that yields nothing, or the configured page
/// cap. All session state lives inside the call and is dropped on every
/// exit path, as are the collaborators when the runner itself goes away.
///
/// A fetcher failure aborts the session: no retries, no partial result.
pub struct SessionRunner<F, U> {
    fetcher: F,
    usage: U,
    guard: UrlGuard,
    cancel: CancellationToken,
}

impl<F, U> SessionRunner<F, U>
where
    F: PageFetcher,
    U: UsageCollector,
{
    /// Create a runner over a fetcher and usage collector.
    pub fn new(fetcher: F, usage: U) -> Self {
        Self {
            fetcher,
            usage,
            guard: UrlGuard::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the base-URL safety guard.
    pub fn with_guard(mut self, guard: UrlGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Attach a cancellation token.
    ///
    /// Cancellation is honored at the inter-page delay: an in-progress fetch
    /// always completes, and a cancelled session yields
    /// [`SessionError::Cancelled`] with no partial result.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run one crawl session.
    pub async fn run(&self, config: &CrawlConfig) -> Result<SessionResult> {
        config.validate(&self.guard)?;
        // Non-empty after validation
        let identity_field = config.required_fields.first().cloned().unwrap_or_default();

        let max_pages = config.pagination.effective_max_pages();
        let delay = config.pagination.delay();

        let mut page: u32 = 1;
        let mut accumulated: Vec<ExtractedRecord> = Vec::new();
        let mut seen = SeenKeys::new();

        info!(base_url = %config.base_url, max_pages, "starting crawl session");

        loop {
            let fetch = self
                .fetcher
                .fetch_page(
                    page,
                    &config.base_url,
                    &config.css_selector,
                    &config.required_fields,
                )
                .await
                .map_err(|source| SessionError::Fetch { page, source })?;

            if fetch.no_results_found {
                debug!(page, "no-results marker, ending pagination");
                break;
            }
            if fetch.records.is_empty() {
                debug!(page, "page yielded no records, ending pagination");
                break;
            }

            let extracted = fetch.records.len();
            let fresh = seen.filter(fetch.records, &identity_field);
            debug!(
                page,
                extracted,
                accepted = fresh.len(),
                "page processed"
            );
            accumulated.extend(fresh);

            if page >= max_pages {
                debug!(page, "page cap reached");
                break;
            }

            page += 1;
            self.pause(delay).await?;
        }

        let usage = self.usage.snapshot();
        info!(
            total_items = accumulated.len(),
            pages_crawled = page,
            "crawl session complete"
        );
        Ok(SessionResult::new(accumulated, page, usage))
    }

    /// Suspend between pages; cancellation takes effect here.
    async fn pause(&self, delay: Duration) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SessionError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
