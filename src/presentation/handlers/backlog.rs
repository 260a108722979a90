use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::ports::ArtifactStoreError;
use crate::domain::{JobId, StoragePath};
use crate::presentation::state::AppState;

use super::error_response;

/// Returns the merged backlog for a completed job.
pub async fn get_backlog(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let Some(job_id) = parse_job_id(&job_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid job id").into_response();
    };

    serve_export(&state, &job_id, "stories.json", "application/json").await
}

/// Streams one of the export artifacts: `stories`, `jira`, or `summary`.
pub async fn export_backlog(
    State(state): State<AppState>,
    Path((job_id, format)): Path<(String, String)>,
) -> impl IntoResponse {
    let Some(job_id) = parse_job_id(&job_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid job id").into_response();
    };

    let (filename, content_type) = match format.as_str() {
        "stories" => ("stories.json", "application/json"),
        "jira" => ("jira_import.json", "application/json"),
        "summary" => ("summary.txt", "text/plain; charset=utf-8"),
        other => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!(
                    "Unknown export format '{}'. Supported: stories, jira, summary",
                    other
                ),
            )
            .into_response();
        }
    };

    serve_export(&state, &job_id, filename, content_type).await
}

async fn serve_export(
    state: &AppState,
    job_id: &JobId,
    filename: &str,
    content_type: &'static str,
) -> axum::response::Response {
    let path = StoragePath::export(job_id, filename);

    match state.artifact_store.fetch(&path).await {
        Ok(data) => ([(header::CONTENT_TYPE, content_type)], data).into_response(),
        Err(ArtifactStoreError::NotFound(_)) => error_response(
            StatusCode::NOT_FOUND,
            "Export not available. The job may still be processing or may have failed.",
        )
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, path = %path, "Failed to fetch export");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch export")
                .into_response()
        }
    }
}

fn parse_job_id(raw: &str) -> Option<JobId> {
    Uuid::parse_str(raw).ok().map(JobId::from_uuid)
}
