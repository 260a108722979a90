use std::io;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use futures::TryStreamExt;
use serde::Serialize;

use crate::application::services::PipelineMessage;
use crate::domain::{ContentType, Document, DocumentId, Job, StoragePath};
use crate::presentation::state::AppState;

use super::error_response;

#[derive(Serialize)]
pub struct IngestResponse {
    pub job_id: String,
    pub document_id: String,
    pub filename: String,
    pub message: &'static str,
}

/// Accepts a multipart upload, stages the raw bytes, records a queued
/// job, and hands the document to the pipeline worker.
pub async fn ingest_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Missing multipart field 'file'",
                )
                .into_response();
            }
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart request: {}", e),
                )
                .into_response();
            }
        }
    };

    let filename = match field.file_name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return error_response(StatusCode::BAD_REQUEST, "Uploaded file has no filename")
                .into_response();
        }
    };

    let content_type = field
        .content_type()
        .and_then(ContentType::from_mime)
        .or_else(|| ContentType::from_extension(&filename));

    let Some(content_type) = content_type else {
        return error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!(
                "Unsupported file type for '{}'. Supported: .pdf, .md, .txt",
                filename
            ),
        )
        .into_response();
    };

    let document_id = DocumentId::new();
    let storage_path = StoragePath::staged(&document_id, &filename);

    let upload_stream = field.map_err(io::Error::other);
    let size_bytes = match state
        .artifact_store
        .store(&storage_path, Box::pin(upload_stream), None)
        .await
    {
        Ok(size) => size,
        Err(e) => {
            tracing::error!(error = %e, path = %storage_path, "Failed to stage upload");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store uploaded file",
            )
            .into_response();
        }
    };

    if size_bytes == 0 {
        if let Err(e) = state.artifact_store.delete(&storage_path).await {
            tracing::warn!(error = %e, path = %storage_path, "Failed to remove empty upload");
        }
        return error_response(StatusCode::BAD_REQUEST, "Uploaded file is empty").into_response();
    }

    let document = Document {
        id: document_id,
        filename: filename.clone(),
        content_type,
        size_bytes,
    };

    let job = Job::new(Some(document.id), Some(document.filename.clone()));
    let job_id = job.id;

    if let Err(e) = state.job_repository.create(&job).await {
        tracing::error!(error = %e, "Failed to create job record");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create job")
            .into_response();
    }

    let message = PipelineMessage {
        job_id,
        document: document.clone(),
        storage_path,
        delete_after_processing: true,
    };

    if let Err(e) = state.pipeline_sender.send(message).await {
        tracing::error!(error = %e, "Pipeline queue is closed");
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Processing queue is unavailable",
        )
        .into_response();
    }

    tracing::info!(
        job_id = %job_id,
        document_id = %document.id.as_uuid(),
        filename = %document.filename,
        size_bytes = document.size_bytes,
        "Document accepted for processing"
    );

    (
        StatusCode::ACCEPTED,
        Json(IngestResponse {
            job_id: job_id.to_string(),
            document_id: document.id.as_uuid().to_string(),
            filename: document.filename,
            message: "Document accepted. Poll the job endpoint for progress.",
        }),
    )
        .into_response()
}
