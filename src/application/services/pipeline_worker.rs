use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{ArtifactStore, FileLoader, JobRepository, TextSplitter};
use crate::domain::{Document, JobId, JobStatus, StoragePath};

use super::pipeline_service::{PipelineError, PipelineService};

pub struct PipelineMessage {
    pub job_id: JobId,
    pub document: Document,
    pub storage_path: StoragePath,
    pub delete_after_processing: bool,
}

/// Drains the job queue and drives each document through the pipeline,
/// recording the stage transitions so status polls reflect progress.
pub struct PipelineWorker<F, T: ?Sized>
where
    F: FileLoader,
    T: TextSplitter,
{
    receiver: mpsc::Receiver<PipelineMessage>,
    service: Arc<PipelineService<F, T>>,
    job_repository: Arc<dyn JobRepository>,
    artifact_store: Arc<dyn ArtifactStore>,
}

impl<F, T: ?Sized> PipelineWorker<F, T>
where
    F: FileLoader + 'static,
    T: TextSplitter + 'static,
{
    pub fn new(
        receiver: mpsc::Receiver<PipelineMessage>,
        service: Arc<PipelineService<F, T>>,
        job_repository: Arc<dyn JobRepository>,
        artifact_store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            receiver,
            service,
            job_repository,
            artifact_store,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Pipeline worker started");
        while let Some(msg) = self.receiver.recv().await {
            let span = tracing::info_span!(
                "pipeline_job",
                job_id = %msg.job_id.as_uuid(),
                document_id = %msg.document.id.as_uuid(),
                filename = %msg.document.filename,
            );
            if let Err(e) = self.process_job(msg).instrument(span).await {
                tracing::error!(error = %e, "Pipeline job failed");
            }
        }
        tracing::info!("Pipeline worker stopped: channel closed");
    }

    async fn process_job(&self, msg: PipelineMessage) -> Result<(), PipelineWorkerError> {
        let job_id = msg.job_id;

        let result = self.run_stages(job_id, &msg.document, &msg.storage_path).await;

        if msg.delete_after_processing {
            if let Err(e) = self.artifact_store.delete(&msg.storage_path).await {
                tracing::warn!(
                    error = %e,
                    path = %msg.storage_path,
                    "Failed to delete staged file after processing"
                );
            }
        }

        match result {
            Ok(story_count) => {
                self.job_repository
                    .set_story_count(job_id, story_count as i64)
                    .await
                    .map_err(PipelineWorkerError::Repository)?;
                self.update_status(job_id, JobStatus::Completed, None)
                    .await?;
                tracing::info!(story_count, "Pipeline job completed");
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                self.update_status(job_id, JobStatus::Failed, Some(&error_msg))
                    .await?;
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        job_id: JobId,
        document: &Document,
        storage_path: &StoragePath,
    ) -> Result<usize, PipelineWorkerError> {
        let data = self
            .artifact_store
            .fetch(storage_path)
            .await
            .map_err(PipelineWorkerError::Staging)?;

        self.update_status(job_id, JobStatus::Extracting, None)
            .await?;
        let text = self.service.extract(&data, document).await?;

        self.update_status(job_id, JobStatus::Chunking, None).await?;
        let chunks = self.service.chunk(job_id, &text, document.id).await?;

        self.update_status(job_id, JobStatus::Generating, None)
            .await?;
        let stories = self.service.generate(job_id, &chunks).await?;

        self.update_status(job_id, JobStatus::Merging, None).await?;
        let merged = self.service.merge(stories).await;

        self.update_status(job_id, JobStatus::Exporting, None)
            .await?;
        let outcome = self.service.export(job_id, merged).await?;

        Ok(outcome.story_count)
    }

    async fn update_status(
        &self,
        job_id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), PipelineWorkerError> {
        tracing::debug!(status = %status, "Job status transition");
        self.job_repository
            .update_status(job_id, status, error_message)
            .await
            .map_err(PipelineWorkerError::Repository)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineWorkerError {
    #[error("pipeline: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("repository: {0}")]
    Repository(crate::application::ports::RepositoryError),
    #[error("staging: {0}")]
    Staging(crate::application::ports::ArtifactStoreError),
}
