//! Cross-page record deduplication.

use std::collections::HashSet;

use crate::types::record::{ExtractedRecord, IdentityKey};

/// The identity keys accepted so far in one session.
///
/// Owned by the running session and discarded with it; dedup state is never
/// shared across sessions.
#[derive(Debug, Default)]
pub struct SeenKeys(HashSet<IdentityKey>);

impl SeenKeys {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter a page's records against everything seen so far.
    ///
    /// Keeps each record whose identity key (derived from `identity_field`)
    /// has not been seen, registering the key as it goes; relative order is
    /// preserved. A key admitted once is never re-admitted, even across
    /// calls. Records with no derivable key are always kept: a malformed
    /// record should be surfaced, not silently dropped.
    pub fn filter(
        &mut self,
        records: Vec<ExtractedRecord>,
        identity_field: &str,
    ) -> Vec<ExtractedRecord> {
        records
            .into_iter()
            .filter(|record| match record.identity_key(identity_field) {
                Some(key) => self.0.insert(key),
                None => true,
            })
            .collect()
    }

    /// Whether a key has been seen.
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.0.contains(key)
    }

    /// Number of distinct keys seen.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no keys have been seen.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
