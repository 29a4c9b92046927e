//! Axum route handlers for the Analysis API.
//!
//! The streaming endpoint relays provider deltas to the browser as they
//! arrive (`{"chunk"}` records), then closes with a single `{"finished"}`
//! or `{"error"}` record. The final structured analysis is persisted onto
//! the interview record when the stream completes.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use futures_util::Stream;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::parse_streaming_result;
use crate::errors::AppError;
use crate::interviews::store;
use crate::llm_client::prompts::build_analysis_prompt;
use crate::models::interview::{InterviewAnalysis, InterviewRecord};
use crate::state::AppState;
use crate::streaming::relay::{spawn_pipeline, AnalysisEvent};

/// POST /api/v1/interviews/:id/analyze
///
/// One-shot analysis: full chat completion, parsed through the strategy
/// chain, persisted onto the record, returned to the caller.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewAnalysis>, AppError> {
    let record = load_record(&state, id).await?;
    let prompt = prompt_for(&state, &record);

    let content = state
        .llm
        .call(&prompt)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let analysis = parse_streaming_result(&content);
    store::save_analysis(&state.db, id, &analysis).await?;

    Ok(Json(analysis))
}

/// POST /api/v1/interviews/:id/analyze/stream
///
/// Streaming analysis over SSE. Each record is `data: <json>\n\n` where the
/// json is one of `{"chunk": ...}`, `{"finished": true, "reason":
/// "completed"}` or `{"error": ...}`. Client disconnect cancels the
/// upstream pipeline.
pub async fn handle_analyze_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let record = load_record(&state, id).await?;
    let prompt = prompt_for(&state, &record);

    let upstream = state
        .llm
        .open_stream(&prompt)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    info!("Streaming analysis started for interview {id}");

    let mut pipeline = spawn_pipeline(upstream);
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(64);
    let db = state.db.clone();

    tokio::spawn(async move {
        while let Some(event) = pipeline.recv().await {
            let payload = match event {
                AnalysisEvent::Chunk(text) => json!({ "chunk": text }),
                AnalysisEvent::Complete(analysis) => {
                    if let Err(e) = store::save_analysis(&db, id, &analysis).await {
                        error!("Failed to persist analysis for interview {id}: {e}");
                    }
                    json!({ "finished": true, "reason": "completed" })
                }
                AnalysisEvent::Error(message) => json!({ "error": message }),
            };

            if tx.send(Ok(Event::default().data(payload.to_string()))).await.is_err() {
                // Client disconnected; dropping the pipeline receiver stops
                // the upstream read and releases the connection.
                info!("Client disconnected from analysis stream for interview {id}");
                break;
            }
        }
    });

    Ok(Sse::new(ReceiverStream::new(rx)))
}

async fn load_record(state: &AppState, id: Uuid) -> Result<InterviewRecord, AppError> {
    store::get_interview(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
}

fn prompt_for(state: &AppState, record: &InterviewRecord) -> String {
    let interview_type = state.prefill.detect_interview_type(&record.position);
    build_analysis_prompt(
        &record.company,
        &record.position,
        &record.interview_date,
        &record.interview_process,
        interview_type,
    )
}
