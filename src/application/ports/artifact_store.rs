use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StoragePath;

/// Object storage for everything the pipeline produces: staged uploads,
/// per-chunk payloads, per-chunk stories, and final exports.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
        content_length: Option<u64>,
    ) -> Result<u64, ArtifactStoreError>;

    async fn store_bytes(&self, path: &StoragePath, data: Bytes)
        -> Result<(), ArtifactStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, ArtifactStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), ArtifactStoreError>;

    async fn head(&self, path: &StoragePath) -> Result<u64, ArtifactStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
