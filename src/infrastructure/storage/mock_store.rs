use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::application::ports::{ArtifactStore, ArtifactStoreError};
use crate::domain::StoragePath;

/// In-memory store for tests. Contents can be inspected afterwards.
#[derive(Default)]
pub struct MockArtifactStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MockArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, path: &StoragePath, data: Bytes) -> Self {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(path.as_str().to_string(), data);
        }
        self
    }

    pub fn get(&self, path: &StoragePath) -> Option<Bytes> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(path.as_str()).cloned())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ArtifactStore for MockArtifactStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, std::io::Error>>,
        _content_length: Option<u64>,
    ) -> Result<u64, ArtifactStoreError> {
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        let len = buffer.len() as u64;
        self.store_bytes(path, Bytes::from(buffer)).await?;
        Ok(len)
    }

    async fn store_bytes(
        &self,
        path: &StoragePath,
        data: Bytes,
    ) -> Result<(), ArtifactStoreError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| ArtifactStoreError::UploadFailed("poisoned lock".to_string()))?;
        objects.insert(path.as_str().to_string(), data);
        Ok(())
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, ArtifactStoreError> {
        self.get(path)
            .map(|b| b.to_vec())
            .ok_or_else(|| ArtifactStoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), ArtifactStoreError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| ArtifactStoreError::DeleteFailed("poisoned lock".to_string()))?;
        objects.remove(path.as_str());
        Ok(())
    }

    async fn head(&self, path: &StoragePath) -> Result<u64, ArtifactStoreError> {
        self.get(path)
            .map(|b| b.len() as u64)
            .ok_or_else(|| ArtifactStoreError::NotFound(path.to_string()))
    }
}
