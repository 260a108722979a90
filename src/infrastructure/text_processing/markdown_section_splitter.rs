use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::{Chunk, DocumentId};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s+.+$").unwrap());

/// Splits on markdown headers so chunks follow the document's own
/// structure, falling back to paragraphs for unstructured text. Small
/// sections are packed together up to `chunk_size` characters, with a
/// trailing overlap carried into the next chunk for context.
pub struct MarkdownSectionSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl MarkdownSectionSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }
}

#[async_trait]
impl TextSplitter for MarkdownSectionSplitter {
    async fn split(
        &self,
        text: &str,
        document_id: DocumentId,
    ) -> Result<Vec<Chunk>, TextSplitterError> {
        let mut sections = split_by_sections(text);
        if sections.len() <= 1 {
            sections = split_by_paragraphs(text);
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut current = String::new();
        let mut index = 0usize;
        let mut start_pos = 0usize;

        for section in sections {
            let would_overflow =
                char_len(&current) + char_len(section) > self.chunk_size && !current.is_empty();

            if would_overflow {
                let content = current.trim().to_string();
                let content_len = char_len(&content);
                chunks.push(Chunk::new(content, document_id, index, start_pos));
                index += 1;

                let overlap_text = tail_chars(&current, self.overlap);
                start_pos += content_len.saturating_sub(char_len(overlap_text));
                current = format!("{overlap_text}\n\n{section}");
            } else {
                if !current.is_empty() {
                    current.push_str("\n\n");
                }
                current.push_str(section);
            }
        }

        if !current.trim().is_empty() {
            chunks.push(Chunk::new(
                current.trim().to_string(),
                document_id,
                index,
                start_pos,
            ));
        }

        Ok(chunks)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of `s`, respecting char boundaries.
fn tail_chars(s: &str, n: usize) -> &str {
    let total = s.chars().count();
    if total <= n {
        return s;
    }
    match s.char_indices().nth(total - n) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

fn split_by_sections(text: &str) -> Vec<&str> {
    let mut boundaries: Vec<usize> = vec![0];
    let mut pos = 0usize;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if pos > 0 && HEADER_RE.is_match(trimmed) {
            boundaries.push(pos);
        }
        pos += line.len();
    }
    boundaries.push(text.len());

    boundaries
        .windows(2)
        .map(|w| text[w[0]..w[1]].trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_by_paragraphs(text: &str) -> Vec<&str> {
    static PARA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
    PARA_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
