//! Remote completion client for OpenAI-compatible chat-completions endpoints.
//!
//! One request per prompt: a system message plus a single user message, no
//! conversation history, no streaming, no retries.  The client is built from
//! the decrypted [`Configuration`] at startup and handed to the pipeline.
//!
//! # Base URL handling
//!
//! Operators paste either the API root (`https://api.openai.com/v1`) or the
//! full endpoint (`https://api.openai.com/v1/chat/completions`).  Both are
//! normalised to the root and `/chat/completions` is appended per request.
//!
//! # Error bodies
//!
//! Non-2xx responses are reported by status plus a length/digest summary of
//! the body, never the body itself: some gateways echo the bearer token back
//! in their error payloads.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use textbox_core::Configuration;
use tracing::debug;

pub use crate::application::dispatch::{CompletionClient, CompletionError, CompletionRequest};

/// Upper bound on one round trip, including the model's generation time.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// [`CompletionClient`] speaking the OpenAI chat-completions protocol.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Builds a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::InvalidConfig`] if the HTTP client cannot be
    /// constructed (e.g. the TLS backend fails to initialise).
    pub fn from_config(config: &Configuration) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", normalize_base_url(config.api_url())),
            api_key: config.api_key().to_string(),
            model: config.model_name().to_string(),
        })
    }

    /// Full URL every request is posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.prompt,
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.without_url().to_string()))?;
        debug!(status = status.as_u16(), body = %summarize_response_body(&text), "completion response");

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                summary: summarize_response_body(&text),
            });
        }

        parse_completion(&text)
    }
}

/// Extracts the trimmed content of `choices[0]` from a response body.
fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::NoChoices)?
        .message
        .content
        .unwrap_or_default();

    let content = content.trim();
    if content.is_empty() {
        return Err(CompletionError::EmptyResponse);
    }
    Ok(content.to_string())
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/chat/completions")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
