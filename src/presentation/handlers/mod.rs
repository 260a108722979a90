mod backlog;
mod health;
mod ingest;
mod job_status;

pub use backlog::{export_backlog, get_backlog};
pub use health::health_check;
pub use ingest::ingest_document;
pub use job_status::get_job_status;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(super) fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
