use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::LlmClient;
use crate::prefill::PrefillStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Form prefill suggestions. Explicitly constructed in `main`; holds its
    /// suggestion lists as owned state, no process-wide singleton.
    pub prefill: Arc<PrefillStore>,
}
