//! Production page fetcher: rendered-page retrieval plus LLM extraction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crawl_session::error::{ConfigError, ConfigResult, FetchError, FetchResult};
use crawl_session::{CrawlConfig, InputFormat, PageFetch, PageFetcher};

use crate::kernel::llm::LlmExtractor;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Marker text sites render when a listing search comes up empty.
const DEFAULT_NO_RESULTS_MARKER: &str = "No Results Found";

/// Fetches listing pages over HTTP and extracts records through the LLM.
///
/// Built per session from the session's [`CrawlConfig`]; the browser
/// settings shape the HTTP client (user agent, timeout) and the LLM
/// settings choose the extraction input format.
pub struct RenderedPageFetcher {
    http: reqwest::Client,
    extractor: Arc<LlmExtractor>,
    input_format: InputFormat,
    optional_fields: Vec<String>,
    no_results_marker: String,
}

impl RenderedPageFetcher {
    /// Build a fetcher for one session.
    pub fn new(config: &CrawlConfig, extractor: Arc<LlmExtractor>) -> ConfigResult<Self> {
        let browser = &config.browser;
        let mut builder = reqwest::Client::builder()
            .user_agent(
                browser
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            )
            .redirect(reqwest::redirect::Policy::limited(5));
        if let Some(timeout_ms) = browser.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder.build().map_err(|e| ConfigError::InvalidValue {
            field: "browser",
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            extractor,
            input_format: config.llm.input_format,
            optional_fields: config.optional_fields.clone(),
            no_results_marker: DEFAULT_NO_RESULTS_MARKER.to_string(),
        })
    }

    /// Override the no-results marker text.
    pub fn with_no_results_marker(mut self, marker: impl Into<String>) -> Self {
        self.no_results_marker = marker.into();
        self
    }
}

#[async_trait]
impl PageFetcher for RenderedPageFetcher {
    async fn fetch_page(
        &self,
        page_number: u32,
        base_url: &str,
        selector: &str,
        required_fields: &[String],
    ) -> FetchResult<PageFetch> {
        let url = page_url(base_url, page_number)?;
        debug!(%url, page_number, "fetching page");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| classify(e, &url))?
            .error_for_status()
            .map_err(|e| classify(e, &url))?;
        let html = response.text().await.map_err(|e| classify(e, &url))?;

        if html.contains(&self.no_results_marker) {
            debug!(%url, "page carries the no-results marker");
            return Ok(PageFetch::no_results());
        }

        let content = match self.input_format {
            InputFormat::Markdown => htmd::convert(&html)
                .map_err(|e| FetchError::Extraction(e.to_string().into()))?,
            InputFormat::Html => html,
        };

        let records = self
            .extractor
            .extract_records(&content, selector, required_fields, &self.optional_fields)
            .await?;
        Ok(PageFetch::records(records))
    }
}

/// The URL for a given 1-based page number.
///
/// Page 1 is the base URL itself; later pages append a `page` query
/// parameter, preserving any query the base URL already carries.
fn page_url(base_url: &str, page_number: u32) -> FetchResult<String> {
    let mut url = Url::parse(base_url).map_err(|_| FetchError::InvalidUrl {
        url: base_url.to_string(),
    })?;
    if page_number > 1 {
        url.query_pairs_mut()
            .append_pair("page", &page_number.to_string());
    }
    Ok(url.into())
}

fn classify(error: reqwest::Error, url: &str) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http(Box::new(error))
    }
}
