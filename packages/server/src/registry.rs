//! Predefined crawl configurations.
//!
//! The registry is built once at startup and lives in application state;
//! nothing here is a process-wide global, so tests can build their own.

use indexmap::IndexMap;

use crawl_session::{BrowserSettings, CrawlConfig, LlmSettings, PaginationPolicy};

/// A named configuration with a human-readable description.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub description: String,
    pub config: CrawlConfig,
}

/// Named crawl configurations available through the API.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    entries: IndexMap<String, RegistryEntry>,
}

impl ConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, returning self for chaining.
    pub fn with_entry(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        config: CrawlConfig,
    ) -> Self {
        self.entries.insert(
            name.into(),
            RegistryEntry {
                description: description.into(),
                config,
            },
        );
        self
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The built-in configurations shipped with the service.
    pub fn builtin() -> Self {
        Self::new()
            .with_entry(
                "dental",
                "Dental clinic listings with ratings and contact details",
                dental_config(),
            )
            .with_entry(
                "minimal",
                "Single-page variant of the dental crawl, required fields only",
                minimal_config(),
            )
            .with_entry(
                "detailed",
                "Deep dental crawl that also requires phone and website",
                detailed_config(),
            )
    }
}

const DENTAL_INSTRUCTION: &str = "\
Extract dental clinic information from the content. For each clinic, find:

Required information:
- Name: The full name of the dental clinic or dentist's practice
- Location: The complete address of the clinic
- Description: A brief description of the clinic, their services, or the dentist's expertise
- Rating: The numerical rating (out of 5 stars) if available

Additional information if present:
- Phone number
- Website URL
- Operating hours
- List of dental specialties or services offered
- Number of reviews
- Price range or insurance information

Extract this information for each dental clinic card or listing found in the content.";

fn dental_config() -> CrawlConfig {
    CrawlConfig::new(
        "https://www.opencare.com/dentists/new-york-ny/",
        LlmSettings::new("gpt-4o-mini", DENTAL_INSTRUCTION),
    )
    .with_selector("div[data-test='search-result-card']")
    .with_required_fields(["name", "location", "description", "rating"])
    .with_optional_fields(["phone", "website", "hours", "specialties", "reviews", "price"])
    .with_pagination(PaginationPolicy::multi_page(5).with_delay_seconds(2.0))
    .with_browser(BrowserSettings::default())
}

fn minimal_config() -> CrawlConfig {
    let mut config = dental_config().with_optional_fields(Vec::<String>::new());
    config.pagination = PaginationPolicy::single_page();
    config
}

fn detailed_config() -> CrawlConfig {
    dental_config()
        .with_required_fields(["name", "location", "description", "rating", "phone", "website"])
        .with_pagination(PaginationPolicy::multi_page(10).with_delay_seconds(3.0))
        .with_browser(BrowserSettings::default().with_timeout_ms(30_000))
}
