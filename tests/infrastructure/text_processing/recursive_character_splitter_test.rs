use storyforge::application::ports::{TextSplitter, TextSplitterError};
use storyforge::domain::DocumentId;
use storyforge::infrastructure::text_processing::RecursiveCharacterSplitter;

#[tokio::test]
async fn given_empty_text_when_split_then_no_chunks() {
    let splitter = RecursiveCharacterSplitter::new(100, 10);
    let chunks = splitter.split("", DocumentId::new()).await.unwrap();
    assert!(chunks.is_empty());
}

#[tokio::test]
async fn given_short_text_when_split_then_single_chunk() {
    let splitter = RecursiveCharacterSplitter::new(100, 10);
    let chunks = splitter.split("short text", DocumentId::new()).await.unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "short text");
    assert_eq!(chunks[0].index, 0);
    assert_eq!(chunks[0].offset, 0);
}

#[tokio::test]
async fn given_long_text_when_split_then_windows_overlap() {
    let splitter = RecursiveCharacterSplitter::new(10, 4);
    let text = "abcdefghijklmnopqrst";
    let chunks = splitter.split(text, DocumentId::new()).await.unwrap();

    assert!(chunks.len() > 1);
    assert_eq!(chunks[0].text, "abcdefghij");
    assert_eq!(chunks[1].offset, 6);
    assert!(chunks[0].text.ends_with(&chunks[1].text[..4]));

    let indexes: Vec<usize> = chunks.iter().map(|c| c.index).collect();
    assert_eq!(indexes, (0..chunks.len()).collect::<Vec<_>>());
}

#[tokio::test]
async fn given_zero_chunk_size_when_split_then_error_instead_of_hanging() {
    let splitter = RecursiveCharacterSplitter::new(0, 0);
    let result = splitter.split("some text", DocumentId::new()).await;

    assert!(matches!(result, Err(TextSplitterError::SplittingFailed(_))));
}

#[tokio::test]
async fn given_multibyte_text_when_split_then_boundaries_respected() {
    let splitter = RecursiveCharacterSplitter::new(4, 1);
    let text = "日本語のテキストです";
    let chunks = splitter.split(text, DocumentId::new()).await.unwrap();

    assert!(!chunks.is_empty());
    let reassembled_chars: usize = chunks.iter().map(|c| c.text.chars().count()).sum();
    assert!(reassembled_chars >= text.chars().count());
}
