//! Session output types.

use serde::{Deserialize, Serialize};

use crate::types::record::ExtractedRecord;

/// Aggregated output of one crawl session.
///
/// Assembled once, at loop termination; `total_items` always equals
/// `records.len()`, and `pages_crawled` is the 1-based number of the last
/// page actually fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    /// Accepted records, in discovery order
    pub records: Vec<ExtractedRecord>,

    /// Record count
    pub total_items: usize,

    /// 1-based number of the last page fetched
    pub pages_crawled: u32,

    /// Cumulative LLM usage snapshot, opaque pass-through
    pub llm_usage: serde_json::Value,
}

impl SessionResult {
    /// Assemble a result from accumulated session state.
    pub fn new(records: Vec<ExtractedRecord>, pages_crawled: u32, llm_usage: serde_json::Value) -> Self {
        Self {
            total_items: records.len(),
            records,
            pages_crawled,
            llm_usage,
        }
    }

    /// Whether the session yielded no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
