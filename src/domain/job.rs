use super::{DocumentId, JobStatus};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub document_id: Option<DocumentId>,
    pub status: JobStatus,
    pub source_filename: Option<String>,
    pub story_count: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Job {
    pub fn new(document_id: Option<DocumentId>, source_filename: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            document_id,
            status: JobStatus::Queued,
            source_filename,
            story_count: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
