// LLM Crawler API
//
// HTTP boundary for crawl sessions: API-key-guarded routes resolve a named
// or inline crawl configuration, run one session through the crawl-session
// library, and return extracted items plus usage statistics.
//
// The kernel module holds the production collaborators (rendered-page
// fetcher and LLM extraction client) behind a backend trait so route
// handlers stay testable without network access.

pub mod config;
pub mod kernel;
pub mod registry;
pub mod security;
pub mod server;

pub use config::Config;
