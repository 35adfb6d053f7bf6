//! Claude messages API client.
//!
//! Every failure mode (connect, timeout, non-2xx, malformed body) maps to
//! `CoreError::Generation`, which the composer recovers from with fallback
//! text.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use motivator_core::ports::TextGeneration;
use motivator_core::CoreError;

/// API version header value required by the messages endpoint.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Claude client, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    /// Base API URL (default: `https://api.anthropic.com`).
    pub api_url: String,
    /// API key sent in the `x-api-key` header.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens to generate (default: `300`).
    pub max_tokens: u32,
    /// Request timeout in seconds (default: `10`).
    pub timeout_secs: u64,
}

impl ClaudeConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                     |
    /// |--------------------------|-----------------------------|
    /// | `CLAUDE_API_URL`         | `https://api.anthropic.com` |
    /// | `CLAUDE_API_KEY`         | (required)                  |
    /// | `CLAUDE_MODEL`           | `claude-3-5-haiku-latest`   |
    /// | `CLAUDE_MAX_TOKENS`      | `300`                       |
    /// | `CLAUDE_TIMEOUT_SECS`    | `10`                        |
    pub fn from_env() -> Self {
        let api_url = std::env::var("CLAUDE_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".into());
        let api_key = std::env::var("CLAUDE_API_KEY").expect("CLAUDE_API_KEY must be set");
        let model =
            std::env::var("CLAUDE_MODEL").unwrap_or_else(|_| "claude-3-5-haiku-latest".into());
        let max_tokens: u32 = std::env::var("CLAUDE_MAX_TOKENS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("CLAUDE_MAX_TOKENS must be a valid u32");
        let timeout_secs: u64 = std::env::var("CLAUDE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("CLAUDE_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            model,
            max_tokens,
            timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Extract the first text block from a messages API response body.
fn extract_text(response: MessagesResponse) -> Result<String, CoreError> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .map(|block| block.text)
        .ok_or_else(|| CoreError::Generation("response contained no text block".into()))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Claude messages endpoint.
pub struct ClaudeClient {
    config: ClaudeConfig,
    http: reqwest::Client,
}

impl ClaudeClient {
    /// Build a client with the request timeout baked into the HTTP client.
    pub fn new(config: ClaudeConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self { config, http }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[async_trait]
impl TextGeneration for ClaudeClient {
    async fn generate(&self, prompt: &str) -> Result<String, CoreError> {
        let url = format!("{}/v1/messages", self.config.api_url);
        tracing::debug!(prompt_len = prompt.len(), model = %self.config.model, "calling Claude API");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| CoreError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Generation(format!(
                "Claude API returned {status}: {body}"
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Generation(format!("malformed response body: {e}")))?;

        extract_text(body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
