//! Extraction orchestrator: build prompt → call model under composed retry
//! policies → sanitize → parse → validate. Strictly sequential per request;
//! any stage failure short-circuits with a classified `ExtractError` and a
//! partial record is never returned.

use serde_json::Value;
use tracing::debug;

use crate::extraction::prompts::build_prompt;
use crate::extraction::sanitize::strip_code_fences;
use crate::extraction::validate::validate_daily_record;
use crate::extraction::ExtractError;
use crate::llm_client::retry::{retry_with_backoff, API_ERROR_POLICY, RATE_LIMIT_POLICY};
use crate::llm_client::{ModelClient, ModelError};
use crate::models::daily_record::DailyRecord;

/// Converts one free-text daily log message into a validated `DailyRecord`.
///
/// The model call is wrapped in two retry policies: the rate-limit policy
/// wraps the transient-error policy, so a rate-limit failure is retried on
/// its own patient budget and each rate-limit retry restarts the transient
/// budget from scratch.
pub async fn extract(text: &str, model: &dyn ModelClient) -> Result<DailyRecord, ExtractError> {
    let prompt = build_prompt(text);
    debug!("built extraction prompt: {} bytes", prompt.len());

    let completion = retry_with_backoff(
        RATE_LIMIT_POLICY,
        |e: &ModelError| matches!(e, ModelError::RateLimited { .. }),
        || {
            retry_with_backoff(
                API_ERROR_POLICY,
                |e: &ModelError| matches!(e, ModelError::Transient { .. }),
                || model.complete(&prompt),
            )
        },
    )
    .await?;

    let cleaned = strip_code_fences(&completion);
    debug!("sanitized completion: {} bytes", cleaned.len());

    let parsed: Value =
        serde_json::from_str(cleaned).map_err(|e| ExtractError::MalformedResponse {
            reason: e.to_string(),
            body: cleaned.to_string(),
        })?;

    validate_daily_record(&parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Scripted model: pops one canned result per call and counts attempts.
    struct ScriptedModel {
        responses: Mutex<VecDeque<Result<String, ModelError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String, ModelError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted model ran out of responses")
        }
    }

    fn rate_limited() -> ModelError {
        ModelError::RateLimited {
            message: "status 429: slow down".to_string(),
        }
    }

    fn transient() -> ModelError {
        ModelError::Transient {
            message: "status 503: overloaded".to_string(),
        }
    }

    fn permanent() -> ModelError {
        ModelError::Permanent {
            message: "status 401: invalid api key".to_string(),
        }
    }

    const EMPTY_RECORD: &str = r#"{"water_intake_ml": 500, "food": [], "activities": [], "skincare": [], "haircare": [], "diy": []}"#;

    #[tokio::test]
    async fn test_happy_path_returns_validated_record() {
        let model = ScriptedModel::new(vec![Ok(EMPTY_RECORD.to_string())]);
        let record = extract("drank 500ml of water", &model).await.unwrap();
        assert_eq!(record.water_intake_ml, 500);
        assert!(record.food.is_empty());
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_water_and_food_scenario() {
        let completion = r#"{
            "water_intake_ml": 250,
            "food": [{
                "name": "boiled eggs",
                "nutrition_facts": {
                    "Calories": 155,
                    "Total Fat": {"amount_g": 10.6, "daily_value_percent": 14},
                    "Saturated Fat": {"amount_g": 3.3, "daily_value_percent": 16},
                    "Trans Fat": {"amount_g": 0.0},
                    "Cholesterol": {"amount_mg": 373, "daily_value_percent": 124},
                    "Sodium": {"amount_mg": 124.0, "daily_value_percent": 5},
                    "Total Carbohydrates": {"amount_g": 1.1, "daily_value_percent": 0},
                    "Dietary Fiber": {"amount_g": 0.0, "daily_value_percent": 0},
                    "Total Sugars": {"amount_g": 1.1},
                    "Added Sugars": {"amount_g": 0.0},
                    "Protein": {"amount_g": 12.6, "daily_value_percent": 25},
                    "Vitamin D": {"amount_mcg": 2.2, "daily_value_percent": 11},
                    "Calcium": {"amount_mg": 50.0, "daily_value_percent": 4},
                    "Iron": {"amount_mg": 1.2, "daily_value_percent": 7},
                    "Potassium": {"amount_mg": 126.0, "daily_value_percent": 3}
                }
            }],
            "activities": [], "skincare": [], "haircare": [], "diy": []
        }"#;
        let model = ScriptedModel::new(vec![Ok(completion.to_string())]);
        let record = extract("drank a glass of water and ate 2 boiled eggs", &model)
            .await
            .unwrap();
        assert_eq!(record.water_intake_ml, 250);
        assert_eq!(record.food.len(), 1);
        assert_eq!(record.food[0].name, "boiled eggs");
        assert!(record.food[0].nutrition_facts.calories > 0);
    }

    #[tokio::test]
    async fn test_fenced_completion_is_sanitized_before_parsing() {
        let fenced = format!("```json\n{EMPTY_RECORD}\n```");
        let model = ScriptedModel::new(vec![Ok(fenced)]);
        let record = extract("drank water", &model).await.unwrap();
        assert_eq!(record.water_intake_ml, 500);
    }

    #[tokio::test]
    async fn test_prose_completion_is_malformed_response() {
        let model = ScriptedModel::new(vec![Ok(
            "Sure! Here is your health summary in plain words.".to_string()
        )]);
        let err = extract("ate an apple", &model).await.unwrap_err();
        match err {
            ExtractError::MalformedResponse { body, .. } => {
                assert!(body.contains("health summary"));
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_schema_violation_propagates() {
        let model = ScriptedModel::new(vec![Ok(r#"{"water_intake_ml": "plenty"}"#.to_string())]);
        let err = extract("drank water", &model).await.unwrap_err();
        assert!(matches!(err, ExtractError::SchemaViolation { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_then_succeeds() {
        let model = ScriptedModel::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
            Ok(EMPTY_RECORD.to_string()),
        ]);
        let started = Instant::now();
        let record = extract("drank water", &model).await.unwrap();
        assert_eq!(record.water_intake_ml, 500);
        assert_eq!(model.calls(), 5);
        // Rate-limit policy backoff: 2s, 4s, 8s, 16s
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4 + 8 + 16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_budget_exhaustion_is_rate_limited_error() {
        let model = ScriptedModel::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
        ]);
        let err = extract("drank water", &model).await.unwrap_err();
        assert!(matches!(err, ExtractError::RateLimited(_)));
        assert_eq!(model.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_budget_exhaustion_is_service_error() {
        let model = ScriptedModel::new(vec![
            Err(transient()),
            Err(transient()),
            Err(transient()),
        ]);
        let started = Instant::now();
        let err = extract("drank water", &model).await.unwrap_err();
        assert!(matches!(err, ExtractError::Service(_)));
        assert_eq!(model.calls(), 3);
        // Transient policy backoff: 5s, 10s
        assert_eq!(started.elapsed(), Duration::from_secs(5 + 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_never_retried() {
        let model = ScriptedModel::new(vec![Err(permanent())]);
        let started = Instant::now();
        let err = extract("drank water", &model).await.unwrap_err();
        match err {
            ExtractError::Service(message) => assert!(message.contains("invalid api key")),
            other => panic!("expected Service, got {other:?}"),
        }
        assert_eq!(model.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retry_resets_transient_budget() {
        // Two transient failures, a rate limit, then two more transient
        // failures: the outer policy restarts the inner budget, so the run
        // still succeeds.
        let model = ScriptedModel::new(vec![
            Err(transient()),
            Err(transient()),
            Err(rate_limited()),
            Err(transient()),
            Err(transient()),
            Ok(EMPTY_RECORD.to_string()),
        ]);
        let record = extract("drank water", &model).await.unwrap();
        assert_eq!(record.water_intake_ml, 500);
        assert_eq!(model.calls(), 6);
    }
}
