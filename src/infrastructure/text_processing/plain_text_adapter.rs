use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{ContentType, Document};

/// Decodes text and markdown uploads, trying UTF-8 first and falling
/// back to Latin-1 for legacy exports. Markdown structure is preserved
/// so the section splitter can use the headers.
pub struct PlainTextAdapter;

#[async_trait]
impl FileLoader for PlainTextAdapter {
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if !matches!(
            document.content_type,
            ContentType::Text | ContentType::Markdown
        ) {
            return Err(FileLoaderError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let text = match String::from_utf8(data.to_vec()) {
            Ok(text) => text,
            Err(_) => {
                tracing::debug!(
                    filename = %document.filename,
                    "Upload is not valid UTF-8, decoding as Latin-1"
                );
                data.iter().map(|&b| b as char).collect()
            }
        };

        if text.trim().is_empty() {
            return Err(FileLoaderError::EmptyDocument);
        }

        Ok(text)
    }
}
