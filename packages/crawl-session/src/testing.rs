//! Testing utilities including mock collaborators.
//!
//! These are useful for testing applications that drive crawl sessions
//! without making real browser or LLM calls.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};
use crate::traits::{
    fetcher::{PageFetch, PageFetcher},
    usage::UsageCollector,
};
use crate::types::record::ExtractedRecord;

/// What a scripted page should produce.
#[derive(Debug, Clone)]
pub enum PageScript {
    /// Return these records
    Records(Vec<ExtractedRecord>),

    /// Signal the end of pagination
    NoResults,

    /// Return an empty page (structurally fine, nothing extracted)
    Empty,

    /// Fail fatally with this message
    Fail(String),
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub page_number: u32,
    pub base_url: String,
    pub selector: String,
    pub required_fields: Vec<String>,
}

/// A mock page fetcher driven by per-page scripts.
///
/// Pages are scripted by 1-based page number; unscripted pages report the
/// end of pagination. All calls are recorded for assertions.
#[derive(Default)]
pub struct MockFetcher {
    scripts: Arc<RwLock<Vec<PageScript>>>,
    calls: Arc<RwLock<Vec<FetchCall>>>,
}

impl MockFetcher {
    /// Create a fetcher with no scripted pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next page, in page order.
    pub fn with_page(self, script: PageScript) -> Self {
        self.scripts.write().unwrap().push(script);
        self
    }

    /// Script a page of records built from (field, value) pairs per record.
    pub fn with_records_page(self, records: Vec<ExtractedRecord>) -> Self {
        self.with_page(PageScript::Records(records))
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches performed.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            scripts: Arc::clone(&self.scripts),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(
        &self,
        page_number: u32,
        base_url: &str,
        selector: &str,
        required_fields: &[String],
    ) -> FetchResult<PageFetch> {
        self.calls.write().unwrap().push(FetchCall {
            page_number,
            base_url: base_url.to_string(),
            selector: selector.to_string(),
            required_fields: required_fields.to_vec(),
        });

        let script = self
            .scripts
            .read()
            .unwrap()
            .get((page_number as usize).saturating_sub(1))
            .cloned();

        match script {
            Some(PageScript::Records(records)) => Ok(PageFetch::records(records)),
            Some(PageScript::Empty) => Ok(PageFetch::records(vec![])),
            Some(PageScript::NoResults) | None => Ok(PageFetch::no_results()),
            Some(PageScript::Fail(message)) => Err(FetchError::Extraction(message.into())),
        }
    }
}

/// A mock usage collector returning a canned snapshot.
#[derive(Debug, Clone)]
pub struct MockUsage {
    snapshot: serde_json::Value,
    calls: Arc<RwLock<usize>>,
}

impl Default for MockUsage {
    fn default() -> Self {
        Self {
            snapshot: serde_json::json!({
                "prompt_tokens": 0,
                "completion_tokens": 0,
                "total_tokens": 0,
                "requests": 0,
            }),
            calls: Arc::new(RwLock::new(0)),
        }
    }
}

impl MockUsage {
    /// Create a collector with the default zeroed snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a canned snapshot value.
    pub fn with_snapshot(mut self, snapshot: serde_json::Value) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// How many times the snapshot was taken.
    pub fn snapshot_count(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

impl UsageCollector for MockUsage {
    fn snapshot(&self) -> serde_json::Value {
        *self.calls.write().unwrap() += 1;
        self.snapshot.clone()
    }
}

/// Build a record from (field, value) string pairs.
pub fn record(fields: &[(&str, &str)]) -> ExtractedRecord {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
        .collect()
}
