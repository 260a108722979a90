use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::Document;

/// Test double that echoes the bytes back as UTF-8 without inspecting
/// the content type.
pub struct MockFileLoader;

#[async_trait::async_trait]
impl FileLoader for MockFileLoader {
    async fn extract_text(
        &self,
        data: &[u8],
        _document: &Document,
    ) -> Result<String, FileLoaderError> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}
