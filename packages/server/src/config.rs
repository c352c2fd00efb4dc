use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::security::SecretString;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Key clients must present in the X-API-Key header
    pub api_key: SecretString,
    /// Key for the LLM extraction endpoint
    pub llm_api_key: SecretString,
    /// OpenAI-compatible API base URL
    pub llm_base_url: String,
    /// Hosts exempted from base-URL safety checks (local fixtures)
    pub allow_hosts: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            api_key: env::var("API_KEY").context("API_KEY must be set")?.into(),
            llm_api_key: env::var("LLM_API_KEY")
                .context("LLM_API_KEY must be set")?
                .into(),
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            allow_hosts: env::var("ALLOW_HOSTS")
                .map(|hosts| {
                    hosts
                        .split(',')
                        .map(str::trim)
                        .filter(|h| !h.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
