pub mod configs;
pub mod crawl;
pub mod health;

pub use configs::configs_handler;
pub use crawl::{crawl_handler, ApiError};
pub use health::health_handler;
