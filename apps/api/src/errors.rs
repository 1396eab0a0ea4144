use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extraction(e) => {
                tracing::error!("Extraction error: {e}");
                match e {
                    ExtractError::RateLimited(_) => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "RATE_LIMITED",
                        "The language model service is overloaded; try again shortly".to_string(),
                    ),
                    ExtractError::Service(_) => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "The language model service failed".to_string(),
                    ),
                    ExtractError::MalformedResponse { reason, body } => {
                        tracing::error!("Offending model output: {body}");
                        (
                            StatusCode::BAD_GATEWAY,
                            "MALFORMED_MODEL_OUTPUT",
                            format!("The language model returned unparseable output: {reason}"),
                        )
                    }
                    ExtractError::SchemaViolation { field, detail } => (
                        StatusCode::BAD_GATEWAY,
                        "SCHEMA_VIOLATION",
                        format!("The language model returned invalid data at `{field}`: {detail}"),
                    ),
                }
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
