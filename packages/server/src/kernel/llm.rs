//! LLM extraction client.
//!
//! A minimal OpenAI-compatible chat-completions client that turns page
//! content into extracted records and keeps cumulative usage counters for
//! the session's usage snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crawl_session::error::{FetchError, FetchResult};
use crawl_session::{ExtractedRecord, LlmSettings, UsageCollector};

use crate::security::SecretString;

/// Chat-completions client scoped to one crawl session.
///
/// Usage counters accumulate from creation, so constructing one extractor
/// per session makes the snapshot a per-session total.
pub struct LlmExtractor {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    settings: LlmSettings,
    usage: UsageCounters,
}

#[derive(Default)]
struct UsageCounters {
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    total_tokens: AtomicU64,
    requests: AtomicU64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Token usage reported by the completion endpoint.
#[derive(Debug, Clone, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl LlmExtractor {
    /// Create an extractor for one session.
    pub fn new(settings: LlmSettings, api_key: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
            settings,
            usage: UsageCounters::default(),
        }
    }

    /// Extract records from one page's content.
    ///
    /// Records missing any required field are dropped here; the session
    /// loop receives valid records only.
    pub async fn extract_records(
        &self,
        content: &str,
        selector: &str,
        required_fields: &[String],
        optional_fields: &[String],
    ) -> FetchResult<Vec<ExtractedRecord>> {
        let system_prompt = self.system_prompt(selector, required_fields, optional_fields);
        let request = ChatRequest {
            model: &self.settings.provider,
            messages: vec![
                Message {
                    role: "system",
                    content: &system_prompt,
                },
                Message {
                    role: "user",
                    content,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(backend_error)?
            .error_for_status()
            .map_err(backend_error)?;

        let payload: ChatResponse = response.json().await.map_err(backend_error)?;

        self.usage.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(usage) = &payload.usage {
            self.record_usage(usage);
        }

        let text = payload
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| FetchError::MalformedPayload {
                reason: "completion response has no choices".into(),
            })?;

        let records = parse_records(text)?;
        let extracted = records.len();
        let valid: Vec<_> = records
            .into_iter()
            .filter(|record| record.has_fields(required_fields))
            .collect();
        debug!(extracted, valid = valid.len(), "extraction call complete");
        Ok(valid)
    }

    fn system_prompt(
        &self,
        selector: &str,
        required_fields: &[String],
        optional_fields: &[String],
    ) -> String {
        let mut prompt = format!(
            "{}\n\nThe page content corresponds to elements matching the CSS selector `{}`.\n\
             Respond with a JSON array of objects, one per item.\n\
             Every object must include these fields: {}.",
            self.settings.instruction,
            selector,
            required_fields.join(", "),
        );
        if !optional_fields.is_empty() {
            prompt.push_str(&format!(
                "\nInclude these fields when the content provides them: {}.",
                optional_fields.join(", "),
            ));
        }
        prompt.push_str("\nRespond with JSON only, no commentary.");
        prompt
    }

    fn record_usage(&self, usage: &Usage) {
        self.usage
            .prompt_tokens
            .fetch_add(usage.prompt_tokens, Ordering::Relaxed);
        self.usage
            .completion_tokens
            .fetch_add(usage.completion_tokens, Ordering::Relaxed);
        self.usage
            .total_tokens
            .fetch_add(usage.total_tokens, Ordering::Relaxed);
    }
}

impl UsageCollector for LlmExtractor {
    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "prompt_tokens": self.usage.prompt_tokens.load(Ordering::Relaxed),
            "completion_tokens": self.usage.completion_tokens.load(Ordering::Relaxed),
            "total_tokens": self.usage.total_tokens.load(Ordering::Relaxed),
            "requests": self.usage.requests.load(Ordering::Relaxed),
        })
    }
}

fn backend_error(error: reqwest::Error) -> FetchError {
    FetchError::Extraction(Box::new(error))
}

/// Parse the model's reply into records.
///
/// Accepts a bare JSON array or an `{"items": [...]}` wrapper, optionally
/// inside a markdown code fence.
fn parse_records(text: &str) -> FetchResult<Vec<ExtractedRecord>> {
    let cleaned = strip_code_fence(text);

    if let Ok(records) = serde_json::from_str::<Vec<ExtractedRecord>>(cleaned) {
        return Ok(records);
    }

    #[derive(Deserialize)]
    struct Wrapped {
        items: Vec<ExtractedRecord>,
    }
    if let Ok(wrapped) = serde_json::from_str::<Wrapped>(cleaned) {
        return Ok(wrapped.items);
    }

    Err(FetchError::MalformedPayload {
        reason: format!(
            "expected a JSON array of records, got: {}",
            truncated(cleaned, 120)
        ),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn truncated(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
