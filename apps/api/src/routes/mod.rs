pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::coaching::handlers as coaching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        // Coaching API
        .route("/api/v1/coach/achievement", post(coaching::handle_achievement))
        .route("/api/v1/coach/project", post(coaching::handle_project_idea))
        .with_state(state)
}
