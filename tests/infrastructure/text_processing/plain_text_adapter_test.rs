use storyforge::application::ports::{FileLoader, FileLoaderError};
use storyforge::domain::{ContentType, Document};
use storyforge::infrastructure::text_processing::PlainTextAdapter;

fn document(content_type: ContentType) -> Document {
    Document::new("spec.txt".to_string(), content_type, 0)
}

#[tokio::test]
async fn given_utf8_text_when_extracted_then_returned_verbatim() {
    let adapter = PlainTextAdapter;
    let text = adapter
        .extract_text(b"The system shall work.", &document(ContentType::Text))
        .await
        .unwrap();

    assert_eq!(text, "The system shall work.");
}

#[tokio::test]
async fn given_markdown_when_extracted_then_headers_preserved() {
    let adapter = PlainTextAdapter;
    let text = adapter
        .extract_text(b"# Title\n\nBody", &document(ContentType::Markdown))
        .await
        .unwrap();

    assert!(text.starts_with("# Title"));
}

#[tokio::test]
async fn given_pdf_content_type_when_extracted_then_unsupported() {
    let adapter = PlainTextAdapter;
    let result = adapter
        .extract_text(b"%PDF-1.4", &document(ContentType::Pdf))
        .await;

    assert!(matches!(
        result,
        Err(FileLoaderError::UnsupportedContentType(_))
    ));
}

#[tokio::test]
async fn given_whitespace_only_when_extracted_then_empty_document() {
    let adapter = PlainTextAdapter;
    let result = adapter
        .extract_text(b"   \n\t  ", &document(ContentType::Text))
        .await;

    assert!(matches!(result, Err(FileLoaderError::EmptyDocument)));
}

#[tokio::test]
async fn given_latin1_bytes_when_extracted_then_decoded_via_fallback() {
    let adapter = PlainTextAdapter;
    // "café" encoded as Latin-1, which is invalid UTF-8.
    let text = adapter
        .extract_text(&[0x63, 0x61, 0x66, 0xe9], &document(ContentType::Text))
        .await
        .unwrap();

    assert_eq!(text, "café");
}
