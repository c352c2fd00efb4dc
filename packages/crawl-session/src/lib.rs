//! Crawl-Session Orchestration Library
//!
//! Drives multi-page scraping sessions over two collaborators, a page
//! fetcher (browser + LLM extraction behind one trait) and a usage
//! collector, handling the control flow they should not have to: page
//! ordering, cross-page deduplication, stop signals, inter-page delays,
//! cancellation, and result aggregation.
//!
//! # Design
//!
//! - One session = one [`SessionRunner::run`] call; all state is call-local
//! - Three independent stop signals: no-results marker, empty page, page cap
//! - Dedup by identity key (first required field), first occurrence wins
//! - Fatal fetch errors abort the session whole; never a partial result
//!
//! # Usage
//!
//! ```rust,ignore
//! use crawl_session::{CrawlConfig, LlmSettings, PaginationPolicy, SessionRunner};
//!
//! let config = CrawlConfig::new("https://example.com/listings", llm_settings)
//!     .with_selector("div.listing-card")
//!     .with_required_fields(["name", "location"])
//!     .with_pagination(PaginationPolicy::multi_page(5));
//!
//! let runner = SessionRunner::new(fetcher, usage);
//! let result = runner.run(&config).await?;
//! println!("{} items over {} pages", result.total_items, result.pages_crawled);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (PageFetcher, UsageCollector)
//! - [`types`] - Config, record, and result types
//! - [`session`] - Dedup state and the pagination loop
//! - [`url_guard`] - Safety validation for caller-supplied base URLs
//! - [`testing`] - Mock collaborators for tests

pub mod error;
pub mod session;
pub mod testing;
pub mod traits;
pub mod types;
pub mod url_guard;

// Re-export core types at crate root
pub use error::{ConfigError, FetchError, SessionError, UrlGuardError};
pub use session::{SeenKeys, SessionRunner};
pub use traits::{PageFetch, PageFetcher, UsageCollector};
pub use types::{
    BrowserSettings, CrawlConfig, ExtractedRecord, IdentityKey, InputFormat, LlmSettings,
    PaginationPolicy, SessionResult,
};
pub use url_guard::UrlGuard;
