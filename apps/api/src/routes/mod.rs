pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::logs::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/log", post(handlers::handle_log))
        .with_state(state)
}
