//! Production collaborators behind the HTTP boundary.

pub mod backend;
pub mod fetcher;
pub mod llm;

pub use backend::{CrawlBackend, LiveBackend};
pub use fetcher::RenderedPageFetcher;
pub use llm::LlmExtractor;
