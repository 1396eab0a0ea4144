//! LLM client — the single point of entry for all language-model calls.
//!
//! ARCHITECTURAL RULE: no other module may call the completions API directly.
//! Handlers and the extraction engine see only the `ModelClient` trait, so the
//! upstream provider can be swapped (or mocked in tests) without touching the
//! pipeline.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod retry;

/// Per-request deadline. A timeout is a transient failure and retried as one.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Failure classification for a single model call. The retry policies key off
/// these kinds: `RateLimited` and `Transient` are retryable on separate
/// budgets, `Permanent` is surfaced immediately.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model service rate limited the request: {message}")]
    RateLimited { message: String },

    #[error("transient model service failure: {message}")]
    Transient { message: String },

    #[error("permanent model service failure: {message}")]
    Permanent { message: String },
}

/// A text-completion service. Given a prompt, returns the raw completion text
/// or a classified failure.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

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

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client for an Azure-hosted OpenAI deployment.
/// Constructed once at startup and shared read-only across requests.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.model, self.api_version
        )
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let request_body = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Providers wrap errors as {"error": {"message": ...}}; fall back
            // to the raw body when the envelope is absent.
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(classify_status(status.as_u16(), message));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| ModelError::Transient {
            message: format!("failed to decode completion body: {e}"),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::Transient {
                message: "model returned an empty completion".to_string(),
            });
        }

        debug!("model call succeeded: {} completion bytes", content.len());

        Ok(content)
    }
}

fn classify_request_error(err: reqwest::Error) -> ModelError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        ModelError::Transient {
            message: err.to_string(),
        }
    } else {
        ModelError::Permanent {
            message: err.to_string(),
        }
    }
}

/// Maps an HTTP status to a failure kind: 429 is rate limiting, 408/5xx are
/// transient, everything else (bad credentials, malformed request) is
/// permanent and must not be retried.
fn classify_status(status: u16, message: String) -> ModelError {
    match status {
        429 => ModelError::RateLimited {
            message: format!("status {status}: {message}"),
        },
        408 | 500..=599 => ModelError::Transient {
            message: format!("status {status}: {message}"),
        },
        _ => ModelError::Permanent {
            message: format!("status {status}: {message}"),
        },
    }
}
