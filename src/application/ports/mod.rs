mod artifact_store;
mod file_loader;
mod job_repository;
mod llm_client;
mod text_splitter;

pub use artifact_store::{ArtifactStore, ArtifactStoreError};
pub use file_loader::{FileLoader, FileLoaderError};
pub use job_repository::{JobRepository, RepositoryError};
pub use llm_client::{LlmClient, LlmClientError};
pub use text_splitter::{TextSplitter, TextSplitterError};
