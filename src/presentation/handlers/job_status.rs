use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::JobId;
use crate::presentation::state::AppState;

use super::error_response;

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub status: String,
    pub document_id: Option<String>,
    pub source_filename: Option<String>,
    pub story_count: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let uuid = match Uuid::parse_str(&job_id) {
        Ok(uuid) => uuid,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid job id: {}", job_id),
            )
            .into_response();
        }
    };

    match state.job_repository.get_by_id(JobId::from_uuid(uuid)).await {
        Ok(Some(job)) => Json(JobStatusResponse {
            id: job.id.to_string(),
            status: job.status.as_str().to_string(),
            document_id: job.document_id.map(|id| id.as_uuid().to_string()),
            source_filename: job.source_filename,
            story_count: job.story_count,
            error_message: job.error_message,
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
        .into_response(),
        Ok(None) => {
            error_response(StatusCode::NOT_FOUND, format!("Job {} not found", job_id))
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load job");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load job")
                .into_response()
        }
    }
}
