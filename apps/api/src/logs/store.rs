//! Insert-only persistence of validated daily records.
//!
//! Records land in the `daily_logs` table as a JSONB document plus the
//! server-assigned calendar date. Nothing in this service updates or deletes
//! a row once written.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::daily_record::DailyRecord;

/// Inserts one validated record and returns the generated identifier.
pub async fn insert_daily_log(
    pool: &PgPool,
    record: &DailyRecord,
    date: NaiveDate,
) -> Result<Uuid> {
    let data = serde_json::to_value(record).context("failed to serialize daily record")?;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO daily_logs (log_date, data) VALUES ($1, $2) RETURNING id",
    )
    .bind(date)
    .bind(&data)
    .fetch_one(pool)
    .await
    .context("failed to insert daily log")?;

    Ok(id)
}
