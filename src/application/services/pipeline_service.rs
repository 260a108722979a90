use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use crate::application::ports::{
    ArtifactStore, ArtifactStoreError, FileLoader, FileLoaderError, LlmClient, TextSplitter,
    TextSplitterError,
};
use crate::domain::{Chunk, Document, DocumentId, JobId, StoragePath, Story};

use super::aggregation::{build_exports, process_stories};
use super::scalable_merger::ScalableMerger;
use super::story_generation::{StoryGenerationError, StoryGenerator};
use super::story_merger::StoryMerger;

/// Which duplicate-elimination approach to run after generation.
/// `Heuristic` never calls the model and suits small backlogs and
/// offline runs; `Scalable` verifies and merges duplicates via the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    Heuristic,
    Scalable,
}

enum Merger {
    Heuristic(StoryMerger),
    Scalable(ScalableMerger),
}

/// Runs a document through the whole backlog pipeline. Each stage is a
/// separate method so callers can interleave their own bookkeeping, and
/// `run` strings them together for one-shot use.
pub struct PipelineService<F, T: ?Sized>
where
    F: FileLoader,
    T: TextSplitter,
{
    file_loader: Arc<F>,
    text_splitter: Arc<T>,
    story_generator: StoryGenerator,
    merger: Merger,
    artifact_store: Arc<dyn ArtifactStore>,
}

pub struct PipelineOutcome {
    pub story_count: usize,
    pub output_files: Vec<StoragePath>,
}

#[derive(Serialize)]
struct ChunkArtifact<'a> {
    index: usize,
    content: &'a str,
    offset: usize,
    document_id: uuid::Uuid,
}

impl<F, T: ?Sized> PipelineService<F, T>
where
    F: FileLoader,
    T: TextSplitter,
{
    pub fn new(
        file_loader: Arc<F>,
        text_splitter: Arc<T>,
        llm: Arc<dyn LlmClient>,
        artifact_store: Arc<dyn ArtifactStore>,
        merge_strategy: MergeStrategy,
    ) -> Self {
        let merger = match merge_strategy {
            MergeStrategy::Heuristic => Merger::Heuristic(StoryMerger::new()),
            MergeStrategy::Scalable => Merger::Scalable(ScalableMerger::new(Arc::clone(&llm))),
        };
        Self {
            file_loader,
            text_splitter,
            story_generator: StoryGenerator::new(llm),
            merger,
            artifact_store,
        }
    }

    pub async fn extract(&self, data: &[u8], document: &Document) -> Result<String, PipelineError> {
        let text = self
            .file_loader
            .extract_text(data, document)
            .await
            .map_err(PipelineError::FileLoading)?;

        if text.trim().is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        Ok(text)
    }

    /// Splits extracted text and persists one artifact per chunk so a
    /// failed run can be inspected after the fact.
    pub async fn chunk(
        &self,
        job_id: JobId,
        text: &str,
        document_id: DocumentId,
    ) -> Result<Vec<Chunk>, PipelineError> {
        let chunks = self
            .text_splitter
            .split(text, document_id)
            .await
            .map_err(PipelineError::Splitting)?;

        if chunks.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        for chunk in &chunks {
            let artifact = ChunkArtifact {
                index: chunk.index,
                content: &chunk.text,
                offset: chunk.offset,
                document_id: chunk.document_id.as_uuid(),
            };
            let payload = serde_json::to_vec_pretty(&artifact)?;
            self.artifact_store
                .store_bytes(&StoragePath::chunk(&job_id, chunk.index), Bytes::from(payload))
                .await?;
        }

        tracing::info!(chunk_count = chunks.len(), "Document chunked");
        Ok(chunks)
    }

    /// Generates stories per chunk. A chunk whose generation fails is
    /// skipped with a warning; the job only fails when no chunk yields
    /// any story at all.
    pub async fn generate(
        &self,
        job_id: JobId,
        chunks: &[Chunk],
    ) -> Result<Vec<Story>, PipelineError> {
        let mut all_stories = Vec::new();
        let mut failed_chunks = 0usize;

        for chunk in chunks {
            match self.story_generator.generate(chunk).await {
                Ok(stories) => {
                    let payload = serde_json::to_vec_pretty(&stories)?;
                    self.artifact_store
                        .store_bytes(
                            &StoragePath::chunk_stories(&job_id, chunk.index),
                            Bytes::from(payload),
                        )
                        .await?;
                    all_stories.extend(stories);
                }
                Err(e) => {
                    failed_chunks += 1;
                    tracing::warn!(
                        chunk_index = chunk.index,
                        error = %e,
                        "Skipping chunk after story generation failure"
                    );
                }
            }
        }

        if all_stories.is_empty() {
            return Err(PipelineError::NoStories { failed_chunks });
        }

        tracing::info!(
            story_count = all_stories.len(),
            failed_chunks,
            "Story generation complete"
        );
        Ok(all_stories)
    }

    pub async fn merge(&self, stories: Vec<Story>) -> Vec<Story> {
        match &self.merger {
            Merger::Heuristic(merger) => merger.merge(stories),
            Merger::Scalable(merger) => merger.merge(stories).await,
        }
    }

    /// Orders the backlog, renders the export formats, and persists
    /// them under the job's output prefix.
    pub async fn export(
        &self,
        job_id: JobId,
        stories: Vec<Story>,
    ) -> Result<PipelineOutcome, PipelineError> {
        let processed = process_stories(stories);
        let exports = build_exports(&processed)?;

        let outputs = [
            ("stories.json", exports.stories_json),
            ("jira_import.json", exports.jira_json),
            ("summary.txt", exports.summary),
        ];

        let mut output_files = Vec::with_capacity(outputs.len());
        for (filename, content) in outputs {
            let path = StoragePath::export(&job_id, filename);
            self.artifact_store
                .store_bytes(&path, Bytes::from(content))
                .await?;
            output_files.push(path);
        }

        tracing::info!(story_count = exports.story_count, "Backlog exported");
        Ok(PipelineOutcome {
            story_count: exports.story_count,
            output_files,
        })
    }

    pub async fn run(
        &self,
        job_id: JobId,
        data: &[u8],
        document: &Document,
    ) -> Result<PipelineOutcome, PipelineError> {
        let text = self.extract(data, document).await?;
        let chunks = self.chunk(job_id, &text, document.id).await?;
        let stories = self.generate(job_id, &chunks).await?;
        let merged = self.merge(stories).await;
        self.export(job_id, merged).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("file loading: {0}")]
    FileLoading(FileLoaderError),
    #[error("document contained no usable text")]
    EmptyDocument,
    #[error("text splitting: {0}")]
    Splitting(TextSplitterError),
    #[error("story generation produced nothing ({failed_chunks} chunks failed)")]
    NoStories { failed_chunks: usize },
    #[error("artifact store: {0}")]
    Store(#[from] ArtifactStoreError),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("story generation: {0}")]
    Generation(#[from] StoryGenerationError),
}
