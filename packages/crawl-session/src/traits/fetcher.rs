//! Page fetcher trait: the crawl loop's view of browser + extractor.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::record::ExtractedRecord;

/// What one page fetch produced.
#[derive(Debug, Clone, Default)]
pub struct PageFetch {
    /// Valid records extracted from the page. Validity (all required fields
    /// present) is the fetcher's responsibility.
    pub records: Vec<ExtractedRecord>,

    /// The page signalled the end of pagination: the listing selector
    /// matched nothing. Distinct from a page that merely yielded no records.
    pub no_results_found: bool,
}

impl PageFetch {
    /// A page with extracted records.
    pub fn records(records: Vec<ExtractedRecord>) -> Self {
        Self {
            records,
            no_results_found: false,
        }
    }

    /// An end-of-pagination page.
    pub fn no_results() -> Self {
        Self {
            records: vec![],
            no_results_found: true,
        }
    }
}

/// Fetches one listing page and extracts its records.
///
/// Implementations wrap the rendering engine and the extraction backend.
/// "No results on this page" must be reported through
/// [`PageFetch::no_results_found`], never as an error; errors are reserved
/// for fatal navigation/extraction failures and abort the whole session.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch page `page_number` (1-based) of `base_url` and extract records
    /// matching `selector`, keeping only records that carry every field in
    /// `required_fields`.
    async fn fetch_page(
        &self,
        page_number: u32,
        base_url: &str,
        selector: &str,
        required_fields: &[String],
    ) -> FetchResult<PageFetch>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<F> {
    async fn fetch_page(
        &self,
        page_number: u32,
        base_url: &str,
        selector: &str,
        required_fields: &[String],
    ) -> FetchResult<PageFetch> {
        (**self)
            .fetch_page(page_number, base_url, selector, required_fields)
            .await
    }
}
