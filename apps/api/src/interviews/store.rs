//! Persistence for interview records.
//!
//! Rows are snake_case; the analysis lives in a JSONB column and is mapped
//! to the API type on read. "Not found" is an `Option`/`bool` signal here,
//! never an error.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::interview::{InterviewAnalysis, InterviewRecord};

#[derive(Debug, sqlx::FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub interview_date: String,
    pub interview_process: String,
    pub analysis: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterviewRow {
    fn into_record(self) -> InterviewRecord {
        let analysis = self.analysis.and_then(|value| {
            serde_json::from_value::<InterviewAnalysis>(value)
                .map_err(|e| warn!("Dropping unreadable stored analysis for {}: {e}", self.id))
                .ok()
        });

        InterviewRecord {
            id: self.id,
            company: self.company,
            position: self.position,
            interview_date: self.interview_date,
            interview_process: self.interview_process,
            analysis,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// All interviews, newest first.
pub async fn list_interviews(db: &PgPool) -> Result<Vec<InterviewRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews ORDER BY created_at DESC",
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(InterviewRow::into_record).collect())
}

pub async fn get_interview(
    db: &PgPool,
    id: Uuid,
) -> Result<Option<InterviewRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row.map(InterviewRow::into_record))
}

pub async fn create_interview(
    db: &PgPool,
    company: &str,
    position: &str,
    interview_date: &str,
    interview_process: &str,
) -> Result<InterviewRecord, sqlx::Error> {
    let row = sqlx::query_as::<_, InterviewRow>(
        "INSERT INTO interviews (id, company, position, interview_date, interview_process) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(company)
    .bind(position)
    .bind(interview_date)
    .bind(interview_process)
    .fetch_one(db)
    .await?;

    Ok(row.into_record())
}

/// Full-record update, including the analysis (this is where an improvement's
/// `completed` flag is flipped). Returns None when the record does not exist.
pub async fn update_interview(
    db: &PgPool,
    id: Uuid,
    company: &str,
    position: &str,
    interview_date: &str,
    interview_process: &str,
    analysis: Option<&InterviewAnalysis>,
) -> Result<Option<InterviewRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, InterviewRow>(
        "UPDATE interviews SET company = $2, position = $3, interview_date = $4, \
         interview_process = $5, analysis = $6, updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(company)
    .bind(position)
    .bind(interview_date)
    .bind(interview_process)
    .bind(analysis.map(Json))
    .fetch_optional(db)
    .await?;

    Ok(row.map(InterviewRow::into_record))
}

/// Attaches a freshly produced analysis to its record.
pub async fn save_analysis(
    db: &PgPool,
    id: Uuid,
    analysis: &InterviewAnalysis,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE interviews SET analysis = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(Json(analysis))
        .execute(db)
        .await?;
    Ok(())
}

/// Returns false when the record did not exist.
pub async fn delete_interview(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
