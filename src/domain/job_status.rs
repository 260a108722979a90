use std::fmt;
use std::str::FromStr;

/// Pipeline stage markers persisted with the job so clients can poll
/// progress while a document works its way to a finished backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Extracting,
    Chunking,
    Generating,
    Merging,
    Exporting,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Extracting => "EXTRACTING",
            JobStatus::Chunking => "CHUNKING",
            JobStatus::Generating => "GENERATING",
            JobStatus::Merging => "MERGING",
            JobStatus::Exporting => "EXPORTING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(JobStatus::Queued),
            "EXTRACTING" => Ok(JobStatus::Extracting),
            "CHUNKING" => Ok(JobStatus::Chunking),
            "GENERATING" => Ok(JobStatus::Generating),
            "MERGING" => Ok(JobStatus::Merging),
            "EXPORTING" => Ok(JobStatus::Exporting),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
