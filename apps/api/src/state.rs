use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::ModelClient;

/// Shared application state injected into all route handlers via Axum
/// extractors. Everything here is read-only with process-wide lifetime:
/// concurrent requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// The language-model client behind its trait so tests can inject a mock.
    pub llm: Arc<dyn ModelClient>,
    pub config: Config,
}
