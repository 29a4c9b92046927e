pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::interviews::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview records
        .route(
            "/api/v1/interviews",
            get(handlers::handle_list_interviews).post(handlers::handle_create_interview),
        )
        .route(
            "/api/v1/interviews/:id",
            get(handlers::handle_get_interview)
                .put(handlers::handle_update_interview)
                .delete(handlers::handle_delete_interview),
        )
        // Analysis
        .route(
            "/api/v1/interviews/:id/analyze",
            post(analysis_handlers::handle_analyze),
        )
        .route(
            "/api/v1/interviews/:id/analyze/stream",
            post(analysis_handlers::handle_analyze_stream),
        )
        // Form prefill
        .route(
            "/api/v1/prefill/companies",
            get(handlers::handle_suggest_companies),
        )
        .route(
            "/api/v1/prefill/positions",
            get(handlers::handle_suggest_positions),
        )
        .route(
            "/api/v1/prefill/templates/:interview_type",
            get(handlers::handle_get_template),
        )
        .with_state(state)
}
