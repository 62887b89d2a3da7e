//! Remote model provider (OpenAI-compatible chat completions).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ModelConfig;
use crate::error::ClassifyError;

/// Environment variable consulted when the config file carries no API key.
pub const API_KEY_ENV: &str = "GRANARY_API_KEY";

/// A remote completion backend for the classifier.
///
/// One prompt in, raw completion text out. Implementations own their
/// timeout; the classifier makes exactly one call per classification and
/// treats any error as a signal to fall back to the heuristic path.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send one prompt and return the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, ClassifyError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat-completions provider.
pub struct ApiModelProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI error response format.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl ApiModelProvider {
    /// Create a provider from configuration. The API key comes from the
    /// config file or, failing that, the environment.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ClassifyError> {
        if !config.enabled() {
            return Err(ClassifyError::NotConfigured(
                "model.base_url is empty".to_string(),
            ));
        }

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .ok_or_else(|| {
                ClassifyError::NotConfigured(format!(
                    "API key not provided and {API_KEY_ENV} env var not set"
                ))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifyError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ModelProvider for ApiModelProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ClassifyError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout
                } else if e.is_connect() {
                    ClassifyError::Transport(format!("Connection failed: {e}"))
                } else {
                    ClassifyError::Transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            // Prefer the message field of an OpenAI-style error body.
            let body = match serde_json::from_str::<ErrorResponse>(&error_text) {
                Ok(parsed) => parsed.error.message,
                Err(_) => error_text,
            };

            return Err(ClassifyError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            ClassifyError::MalformedResponse(format!("Failed to parse response: {e}"))
        })?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ClassifyError::MalformedResponse("response contained no choices".to_string())
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
