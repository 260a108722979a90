mod chunk;
mod document;
mod job;
mod job_status;
mod storage_path;
mod story;

pub use chunk::{Chunk, ChunkId, DocumentId};
pub use document::{ContentType, Document};
pub use job::{Job, JobId};
pub use job_status::JobStatus;
pub use storage_path::StoragePath;
pub use story::Story;
