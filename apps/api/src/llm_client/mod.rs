/// LLM Client — the single point of entry for all scoring-provider calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All provider interactions MUST go through this module.
///
/// One `call` is one HTTP attempt. Retry policy is applied by callers through
/// `retry::retry_with_backoff`, so every failure here is classified precisely.
use std::fmt;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProviderSettings;

pub mod prompts;
pub mod retry;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("credential rejected: {0}")]
    Auth(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider unavailable (status {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    /// Whether a fresh attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Timeout
                | LlmError::RateLimited(_)
                | LlmError::Unavailable { .. }
                | LlmError::Transport(_)
        )
    }

    /// Whether the provider answered but with content we could not use.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, LlmError::Malformed(_) | LlmError::EmptyContent)
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Malformed(err.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }

    fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => LlmError::Auth(message),
            408 => LlmError::Timeout,
            429 => LlmError::RateLimited(message),
            500..=599 => LlmError::Unavailable { status, message },
            _ => LlmError::Rejected { status, message },
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Client for the scoring provider's Messages API.
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmClient {
    /// Builds the shared HTTP client. The per-call timeout comes from `settings.timeout`.
    pub fn new(settings: &ProviderSettings) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone().unwrap_or_default(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
        })
    }

    /// Returns a client bound to a caller-supplied credential and model,
    /// sharing this client's connection pool.
    pub fn with_credentials(&self, api_key: Option<&str>, model: Option<&str>) -> Self {
        Self {
            client: self.client.clone(),
            api_key: api_key.map(str::to_string).unwrap_or_else(|| self.api_key.clone()),
            model: model.map(str::to_string).unwrap_or_else(|| self.model.clone()),
            base_url: self.base_url.clone(),
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a single call to the provider, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::from_reqwest)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            if status.is_server_error() || status.as_u16() == 429 {
                warn!("Provider returned {}: {}", status, message);
            }
            return Err(LlmError::from_status(status.as_u16(), message));
        }

        let body = response.text().await.map_err(LlmError::from_reqwest)?;
        let llm_response: LlmResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Malformed(e.to_string()))?;

        debug!(
            "Provider call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }

    /// Convenience method that calls the provider and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(|e| LlmError::Malformed(e.to_string()))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
