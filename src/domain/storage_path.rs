use std::fmt;

use super::chunk::DocumentId;
use super::job::JobId;

/// Object key inside the artifact store. Every pipeline stage reads and
/// writes under a fixed prefix so a job's artifacts are enumerable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn staged(document_id: &DocumentId, filename: &str) -> Self {
        Self(format!("staging/{}/{}", document_id.as_uuid(), filename))
    }

    pub fn chunk(job_id: &JobId, index: usize) -> Self {
        Self(format!("chunks/{}/chunk_{}.json", job_id.as_uuid(), index))
    }

    pub fn chunk_stories(job_id: &JobId, index: usize) -> Self {
        Self(format!(
            "stories/{}/chunk_{}_stories.json",
            job_id.as_uuid(),
            index
        ))
    }

    pub fn export(job_id: &JobId, filename: &str) -> Self {
        Self(format!("output/{}/{}", job_id.as_uuid(), filename))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
