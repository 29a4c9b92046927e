//! Axum route handlers for interview record CRUD and form prefill.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interviews::store;
use crate::models::interview::{InterviewAnalysis, InterviewRecord};
use crate::prefill::InterviewType;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterviewRequest {
    pub company: String,
    pub position: String,
    pub interview_date: String,
    pub interview_process: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInterviewRequest {
    pub company: String,
    pub position: String,
    pub interview_date: String,
    pub interview_process: String,
    #[serde(default)]
    pub analysis: Option<InterviewAnalysis>,
}

#[derive(Debug, Deserialize)]
pub struct PositionSuggestionQuery {
    pub company: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub template: String,
    pub tips: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Interview CRUD
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<InterviewRecord>>, AppError> {
    let records = store::list_interviews(&state.db).await?;
    Ok(Json(records))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewRecord>, AppError> {
    let record = store::get_interview(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    Ok(Json(record))
}

/// POST /api/v1/interviews
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRecord>), AppError> {
    validate_fields(&request.company, &request.position, &request.interview_process)?;

    let record = store::create_interview(
        &state.db,
        request.company.trim(),
        request.position.trim(),
        request.interview_date.trim(),
        &request.interview_process,
    )
    .await?;

    state.prefill.record_usage(&record.company, &record.position);

    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/v1/interviews/:id
pub async fn handle_update_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInterviewRequest>,
) -> Result<Json<InterviewRecord>, AppError> {
    validate_fields(&request.company, &request.position, &request.interview_process)?;

    let record = store::update_interview(
        &state.db,
        id,
        request.company.trim(),
        request.position.trim(),
        request.interview_date.trim(),
        &request.interview_process,
        request.analysis.as_ref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

    Ok(Json(record))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = store::delete_interview(&state.db, id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Interview {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn validate_fields(company: &str, position: &str, process: &str) -> Result<(), AppError> {
    if company.trim().is_empty() {
        return Err(AppError::Validation("company cannot be empty".to_string()));
    }
    if position.trim().is_empty() {
        return Err(AppError::Validation("position cannot be empty".to_string()));
    }
    if process.trim().is_empty() {
        return Err(AppError::Validation(
            "interviewProcess cannot be empty".to_string(),
        ));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Prefill
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/prefill/companies
pub async fn handle_suggest_companies(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.prefill.suggest_companies())
}

/// GET /api/v1/prefill/positions?company=...
pub async fn handle_suggest_positions(
    State(state): State<AppState>,
    Query(query): Query<PositionSuggestionQuery>,
) -> Json<Vec<String>> {
    Json(state.prefill.suggest_positions(&query.company))
}

/// GET /api/v1/prefill/templates/:interview_type
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TemplateResponse>, AppError> {
    let interview_type = InterviewType::from_slug(&slug)
        .ok_or_else(|| AppError::Validation(format!("Unknown interview type '{slug}'")))?;

    Ok(Json(TemplateResponse {
        template: state.prefill.template(interview_type).to_string(),
        tips: state.prefill.preparation_tips(interview_type),
    }))
}
