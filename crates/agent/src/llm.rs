//! Chat-completion client for the remote advisory endpoint.
//!
//! The wire format is the OpenAI-compatible `POST {base}/v1/chat/completions`
//! shape: a list of role/content messages plus model parameters in, a list
//! of choices out. Only the first choice's message content is used.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use storefront_core::config::LlmConfig;
use thiserror::Error;
use tracing::{debug, warn};

/// Longest body excerpt kept in an [`LlmError::HttpStatus`].
const ERROR_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm transport failure: {0}")]
    Transport(String),
    #[error("llm endpoint returned {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },
    #[error("llm response could not be decoded: {0}")]
    Decode(String),
    #[error("llm response contained no choices")]
    EmptyChoices,
    #[error("llm client misconfigured: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one completion request and returns the reply text.
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, LlmError>;
}

pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    url_chat: String,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: &str, api_key: &SecretString, timeout: Duration) -> Result<Self, LlmError> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(LlmError::Configuration(format!("invalid base url `{base_url}`")));
        }

        let mut headers = header::HeaderMap::new();
        let mut bearer =
            header::HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
                .map_err(|error| LlmError::Configuration(format!("invalid api key header: {error}")))?;
        bearer.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|error| LlmError::Configuration(error.to_string()))?;

        Ok(Self { client, url_chat: format!("{base}/v1/chat/completions") })
    }

    /// Builds a client when a non-blank credential is configured; `Ok(None)`
    /// otherwise.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        match config.api_key.as_ref().filter(|_| config.has_credential()) {
            Some(api_key) => Self::new(
                &config.base_url,
                api_key,
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.url_chat
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, LlmError> {
        let started = Instant::now();
        debug!(
            event_name = "assistant.llm.request",
            model = %request.model,
            message_count = request.messages.len(),
            "POST {}",
            self.url_chat
        );

        let response = self.client.post(&self.url_chat).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet = body.chars().take(ERROR_SNIPPET_CHARS).collect::<String>();
            warn!(
                event_name = "assistant.llm.http_status",
                status = status.as_u16(),
                latency_ms = started.elapsed().as_millis() as u64,
                "llm endpoint returned non-success status"
            );
            return Err(LlmError::HttpStatus { status: status.as_u16(), snippet });
        }

        let decoded: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|error| LlmError::Decode(format!("{error}; expected `choices[0].message`")))?;

        let content = decoded
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyChoices)?
            .message
            .content
            .unwrap_or_default();

        debug!(
            event_name = "assistant.llm.completed",
            latency_ms = started.elapsed().as_millis() as u64,
            reply_chars = content.chars().count(),
            "llm completion received"
        );
        Ok(content)
    }
}
