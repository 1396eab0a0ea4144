// Structured-extraction pipeline: prompt build → model call under retries →
// sanitize → parse → validate. All LLM calls go through llm_client — no
// direct provider calls here.

pub mod engine;
pub mod prompts;
pub mod sanitize;
pub mod validate;

use thiserror::Error;

use crate::llm_client::ModelError;

pub use engine::extract;

/// Failure taxonomy surfaced by `extract`. Exactly one kind per failure; the
/// router maps these to transport status codes.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The rate-limit retry budget was exhausted; upstream is overloaded.
    #[error("rate limit retries exhausted: {0}")]
    RateLimited(String),

    /// The transient retry budget was exhausted, or the service failed with a
    /// non-retryable error (bad credentials, malformed request).
    #[error("model service failure: {0}")]
    Service(String),

    /// The sanitized model output could not be parsed as JSON. Carries the
    /// offending text for diagnostics.
    #[error("model output is not valid JSON: {reason}")]
    MalformedResponse { reason: String, body: String },

    /// Parsed output does not conform to the record shape and no safe
    /// coercion applied. Names the field and what was expected.
    #[error("model output violates the record schema at `{field}`: {detail}")]
    SchemaViolation { field: String, detail: String },
}

impl From<ModelError> for ExtractError {
    fn from(err: ModelError) -> Self {
        match &err {
            ModelError::RateLimited { .. } => Self::RateLimited(err.to_string()),
            ModelError::Transient { .. } | ModelError::Permanent { .. } => {
                Self::Service(err.to_string())
            }
        }
    }
}
