use std::sync::Arc;

use crate::application::ports::TextSplitter;
use crate::presentation::config::ChunkingStrategy;

use super::{MarkdownSectionSplitter, RecursiveCharacterSplitter};

pub struct TextSplitterFactory;

impl TextSplitterFactory {
    pub fn create(
        strategy: ChunkingStrategy,
        chunk_size: usize,
        overlap: usize,
    ) -> Arc<dyn TextSplitter> {
        match strategy {
            ChunkingStrategy::Section => Arc::new(MarkdownSectionSplitter::new(chunk_size, overlap)),
            ChunkingStrategy::Fixed => {
                Arc::new(RecursiveCharacterSplitter::new(chunk_size, overlap))
            }
        }
    }
}
