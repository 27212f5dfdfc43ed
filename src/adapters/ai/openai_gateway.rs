//! OpenAI Gateway - ConversationGateway implementation over the OpenAI
//! chat completions API.
//!
//! The fixed presenter persona is prepended as the leading system message
//! of every request, followed by the session transcript.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::game::Role;
use crate::domain::oracle::prompts;
use crate::ports::{ChatMessage, ConversationGateway, GatewayError};

/// Configuration for the OpenAI gateway.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Maximum tokens per reply. The presenter is a spoken assistant, so
    /// replies are kept short.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_tokens: 250,
            temperature: 0.8,
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI chat-completions gateway.
pub struct OpenAiGateway {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_request_body(&self, transcript: &[ChatMessage]) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: prompts::presenter_persona().to_string(),
        });
        for msg in transcript {
            messages.push(WireMessage {
                role: match msg.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: msg.content.clone(),
            });
        }

        ChatCompletionRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages,
        }
    }

    async fn send_once(&self, transcript: &[ChatMessage]) -> Result<String, GatewayError> {
        let body = self.to_request_body(transcript);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    GatewayError::network(format!("connection failed: {e}"))
                } else {
                    GatewayError::network(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;
        self.parse_response(response).await
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(GatewayError::AuthenticationFailed),
            429 => Err(GatewayError::unavailable(format!(
                "rate limited: {error_body}"
            ))),
            500..=599 => Err(GatewayError::unavailable(format!(
                "server error {status}: {error_body}"
            ))),
            _ => Err(GatewayError::network(format!(
                "unexpected status {status}: {error_body}"
            ))),
        }
    }

    async fn parse_response(&self, response: Response) -> Result<String, GatewayError> {
        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(format!("failed to parse body: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GatewayError::invalid_response("no choices in completion"))
    }
}

#[async_trait]
impl ConversationGateway for OpenAiGateway {
    async fn send(&self, transcript: &[ChatMessage]) -> Result<String, GatewayError> {
        let mut last_error = GatewayError::unavailable("no attempts made");

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(500 * 2u64.pow(attempt - 1));
                tracing::warn!(attempt, "retrying oracle request after {:?}", backoff);
                sleep(backoff).await;
            }

            match self.send_once(transcript).await {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_transient() => last_error = err,
                Err(err) => return Err(err),
            }
        }

        tracing::error!("oracle request failed after retries: {last_error}");
        Err(last_error)
    }
}

// ════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}
