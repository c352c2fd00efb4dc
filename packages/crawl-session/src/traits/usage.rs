//! Usage collector trait: cumulative LLM usage statistics.

/// Exposes cumulative usage counters (tokens, requests) gathered since the
/// collector was created.
///
/// The crawl loop queries this exactly once, at session end, and treats the
/// snapshot as opaque pass-through data.
pub trait UsageCollector: Send + Sync {
    /// Current cumulative counters.
    fn snapshot(&self) -> serde_json::Value;
}

impl<U: UsageCollector + ?Sized> UsageCollector for std::sync::Arc<U> {
    fn snapshot(&self) -> serde_json::Value {
        (**self).snapshot()
    }
}
