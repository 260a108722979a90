use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{ArtifactStore, ArtifactStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::object_store_adapter::ObjectStoreAdapter;

pub struct ArtifactStoreFactory;

impl ArtifactStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn ArtifactStore>, ArtifactStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                let store = ObjectStoreAdapter::local(path)?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::S3 => {
                let bucket = settings.s3_bucket.as_deref().ok_or_else(|| {
                    ArtifactStoreError::UploadFailed("s3_bucket required".into())
                })?;
                let store = ObjectStoreAdapter::s3(
                    bucket,
                    settings.s3_region.as_deref(),
                    settings.s3_endpoint.as_deref(),
                )?;
                Ok(Arc::new(store))
            }
        }
    }
}
