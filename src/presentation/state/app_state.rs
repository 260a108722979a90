use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::{ArtifactStore, JobRepository};
use crate::application::services::PipelineMessage;
use crate::presentation::config::Settings;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub job_repository: Arc<dyn JobRepository>,
    pub artifact_store: Arc<dyn ArtifactStore>,
    pub pipeline_sender: mpsc::Sender<PipelineMessage>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        artifact_store: Arc<dyn ArtifactStore>,
        pipeline_sender: mpsc::Sender<PipelineMessage>,
        settings: Settings,
    ) -> Self {
        Self {
            job_repository,
            artifact_store,
            pipeline_sender,
            settings,
        }
    }
}
