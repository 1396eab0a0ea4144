//! Axum route handlers for the daily-log API.

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extraction;
use crate::logs::store::insert_daily_log;
use crate::models::daily_record::DailyRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub message: String,
}

/// A persisted record as returned to the caller: the validated record plus
/// the server-assigned date and storage identifier.
#[derive(Debug, Serialize)]
pub struct StoredRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub record: DailyRecord,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub status: String,
    pub data: StoredRecord,
}

/// POST /api/v1/log
///
/// Extracts a structured record from the user's message, stamps today's UTC
/// date, and persists it. Empty input is rejected before any model call.
pub async fn handle_log(
    State(state): State<AppState>,
    Json(request): Json<LogRequest>,
) -> Result<Json<LogResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let record = extraction::extract(&request.message, state.llm.as_ref()).await?;

    // Date and identifier are assigned here, never taken from model output
    let date = Utc::now().date_naive();
    let id = insert_daily_log(&state.db, &record, date)
        .await
        .map_err(AppError::Internal)?;

    info!("daily log saved: {id}");

    Ok(Json(LogResponse {
        status: "success".to_string(),
        data: StoredRecord {
            id: id.to_string(),
            date,
            record,
        },
    }))
}
