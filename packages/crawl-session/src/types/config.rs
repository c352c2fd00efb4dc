//! Configuration types for crawl sessions.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::url_guard::UrlGuard;

/// Configuration for one crawl session.
///
/// Immutable once a session starts. The `browser` and `llm` sub-configs are
/// opaque to the pagination loop and passed through to the page fetcher
/// unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Starting URL; page 2+ URLs are derived from it by the fetcher
    pub base_url: String,

    /// CSS selector scoping the listing cards on each page
    pub css_selector: String,

    /// Field names every extracted record must carry, in validation order.
    /// The first one doubles as the record's identity field for dedup.
    pub required_fields: Vec<String>,

    /// Field names to extract when present
    #[serde(default)]
    pub optional_fields: Vec<String>,

    /// Pagination policy
    #[serde(default)]
    pub pagination: PaginationPolicy,

    /// Browser/rendering settings, passed through to the fetcher
    #[serde(default)]
    pub browser: BrowserSettings,

    /// LLM extraction settings, passed through to the fetcher
    pub llm: LlmSettings,
}

impl CrawlConfig {
    /// Create a config for a base URL with the given LLM settings.
    pub fn new(base_url: impl Into<String>, llm: LlmSettings) -> Self {
        Self {
            base_url: base_url.into(),
            css_selector: String::new(),
            required_fields: vec![],
            optional_fields: vec![],
            pagination: PaginationPolicy::default(),
            browser: BrowserSettings::default(),
            llm,
        }
    }

    /// Set the CSS selector.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.css_selector = selector.into();
        self
    }

    /// Set the required field names.
    pub fn with_required_fields(
        mut self,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.required_fields = fields.into_iter().map(|f| f.into()).collect();
        self
    }

    /// Set the optional field names.
    pub fn with_optional_fields(
        mut self,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.optional_fields = fields.into_iter().map(|f| f.into()).collect();
        self
    }

    /// Set the pagination policy.
    pub fn with_pagination(mut self, pagination: PaginationPolicy) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the browser settings.
    pub fn with_browser(mut self, browser: BrowserSettings) -> Self {
        self.browser = browser;
        self
    }

    /// The field dedup keys are derived from: the first required field.
    pub fn identity_field(&self) -> Option<&str> {
        self.required_fields.first().map(String::as_str)
    }

    /// Validate the config at the session boundary.
    ///
    /// The pagination loop assumes a validated config; all violations are
    /// reported here, before the first fetch.
    pub fn validate(&self, guard: &UrlGuard) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingValue { field: "base_url" });
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
            });
        }
        guard.check(&self.base_url)?;

        if self.css_selector.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "css_selector",
            });
        }
        if self.required_fields.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "required_fields",
            });
        }
        self.pagination.validate()?;
        self.llm.validate()?;
        Ok(())
    }
}

/// When to stop fetching further pages, and how long to wait between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationPolicy {
    /// Fetch beyond the first page
    pub multi_page: bool,

    /// Page cap; ignored when `multi_page` is false
    pub max_pages: u32,

    /// Delay between page requests, in seconds
    pub delay_seconds: f64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            multi_page: false,
            max_pages: 1,
            delay_seconds: 2.0,
        }
    }
}

impl PaginationPolicy {
    /// Single-page policy.
    pub fn single_page() -> Self {
        Self::default()
    }

    /// Multi-page policy with a page cap.
    pub fn multi_page(max_pages: u32) -> Self {
        Self {
            multi_page: true,
            max_pages,
            ..Self::default()
        }
    }

    /// Set the inter-page delay.
    pub fn with_delay_seconds(mut self, seconds: f64) -> Self {
        self.delay_seconds = seconds;
        self
    }

    /// The page cap actually in force: 1 unless `multi_page` is set.
    pub fn effective_max_pages(&self) -> u32 {
        if self.multi_page {
            self.max_pages
        } else {
            1
        }
    }

    /// The inter-page delay as a `Duration`.
    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.delay_seconds)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.max_pages < 1 {
            return Err(ConfigError::InvalidValue {
                field: "max_pages",
                reason: "must be at least 1".into(),
            });
        }
        if !self.delay_seconds.is_finite() || self.delay_seconds < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "delay_seconds",
                reason: format!("must be a non-negative number, got {}", self.delay_seconds),
            });
        }
        Ok(())
    }
}

/// Rendering settings for the page fetcher. Opaque to the pagination loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Run the renderer without a visible window
    pub headless: bool,

    /// Reuse cached page content where the fetcher supports it
    pub cache_enabled: bool,

    /// User-Agent header override
    pub user_agent: Option<String>,

    /// Per-request timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// Extra settle time after navigation, in milliseconds
    pub wait_ms: Option<u64>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            cache_enabled: false,
            user_agent: None,
            timeout_ms: None,
            wait_ms: None,
        }
    }
}

impl BrowserSettings {
    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

/// What the fetcher feeds the extraction model: raw HTML or a markdown
/// rendition of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Markdown,
    Html,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self::Markdown
    }
}

/// LLM extraction settings. Opaque to the pagination loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Model identifier, e.g. "gpt-4o-mini"
    pub provider: String,

    /// Extraction instruction sent with every page
    pub instruction: String,

    /// Page content format handed to the model
    #[serde(default)]
    pub input_format: InputFormat,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Completion token cap
    pub max_tokens: Option<u32>,
}

impl LlmSettings {
    /// Create settings for a model with an extraction instruction.
    pub fn new(provider: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            instruction: instruction.into(),
            input_format: InputFormat::default(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the input format.
    pub fn with_input_format(mut self, format: InputFormat) -> Self {
        self.input_format = format;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.provider.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "llm.provider",
            });
        }
        if self.instruction.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "llm.instruction",
            });
        }
        Ok(())
    }
}
