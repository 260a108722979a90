use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use storyforge::application::ports::{
    ArtifactStore, JobRepository, LlmClient, LlmClientError,
};
use storyforge::application::services::{
    MergeStrategy, PipelineError, PipelineMessage, PipelineService, PipelineWorker,
};
use storyforge::domain::{ContentType, Document, Job, JobId, JobStatus, StoragePath};
use storyforge::infrastructure::llm::MockLlmClient;
use storyforge::infrastructure::persistence::InMemoryJobRepository;
use storyforge::infrastructure::storage::MockArtifactStore;
use storyforge::infrastructure::text_processing::{MarkdownSectionSplitter, MockFileLoader};

const SAMPLE_DOC: &str = "# Requirements\n\nUsers must be able to register with an email address.\n";

struct FailingLlm;

#[async_trait::async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmClientError> {
        Err(LlmClientError::ApiRequestFailed("boom".to_string()))
    }
}

fn service(
    llm: Arc<dyn LlmClient>,
    store: Arc<MockArtifactStore>,
) -> PipelineService<MockFileLoader, MarkdownSectionSplitter> {
    PipelineService::new(
        Arc::new(MockFileLoader),
        Arc::new(MarkdownSectionSplitter::new(4000, 200)),
        llm,
        store as Arc<dyn ArtifactStore>,
        MergeStrategy::Heuristic,
    )
}

fn text_document(size: u64) -> Document {
    Document::new("requirements.md".to_string(), ContentType::Markdown, size)
}

#[tokio::test]
async fn given_markdown_document_when_run_then_exports_all_three_artifacts() {
    let store = Arc::new(MockArtifactStore::new());
    let svc = service(Arc::new(MockLlmClient), Arc::clone(&store));
    let job_id = JobId::new();

    let outcome = svc
        .run(job_id, SAMPLE_DOC.as_bytes(), &text_document(SAMPLE_DOC.len() as u64))
        .await
        .unwrap();

    assert_eq!(outcome.story_count, 1);
    assert_eq!(outcome.output_files.len(), 3);

    for filename in ["stories.json", "jira_import.json", "summary.txt"] {
        let path = StoragePath::export(&job_id, filename);
        assert!(store.get(&path).is_some(), "missing export {filename}");
    }
}

#[tokio::test]
async fn given_markdown_document_when_run_then_chunk_artifacts_persisted() {
    let store = Arc::new(MockArtifactStore::new());
    let svc = service(Arc::new(MockLlmClient), Arc::clone(&store));
    let job_id = JobId::new();

    svc.run(job_id, SAMPLE_DOC.as_bytes(), &text_document(SAMPLE_DOC.len() as u64))
        .await
        .unwrap();

    assert!(store.get(&StoragePath::chunk(&job_id, 0)).is_some());
    assert!(store.get(&StoragePath::chunk_stories(&job_id, 0)).is_some());
}

#[tokio::test]
async fn given_blank_document_when_run_then_fails_with_empty_document() {
    let store = Arc::new(MockArtifactStore::new());
    let svc = service(Arc::new(MockLlmClient), Arc::clone(&store));

    let result = svc
        .run(JobId::new(), b"   \n  ", &text_document(6))
        .await;

    assert!(matches!(result, Err(PipelineError::EmptyDocument)));
}

#[tokio::test]
async fn given_model_outage_when_run_then_fails_with_no_stories() {
    let store = Arc::new(MockArtifactStore::new());
    let svc = service(Arc::new(FailingLlm), Arc::clone(&store));

    let result = svc
        .run(JobId::new(), SAMPLE_DOC.as_bytes(), &text_document(SAMPLE_DOC.len() as u64))
        .await;

    assert!(matches!(result, Err(PipelineError::NoStories { .. })));
}

#[tokio::test]
async fn given_queued_message_when_worker_runs_then_job_completes_and_staging_cleaned() {
    let store = Arc::new(MockArtifactStore::new());
    let repository = Arc::new(InMemoryJobRepository::new());
    let svc = Arc::new(service(Arc::new(MockLlmClient), Arc::clone(&store)));

    let document = text_document(SAMPLE_DOC.len() as u64);
    let staged = StoragePath::staged(&document.id, &document.filename);
    store
        .store_bytes(&staged, Bytes::from_static(SAMPLE_DOC.as_bytes()))
        .await
        .unwrap();

    let job = Job::new(Some(document.id), Some(document.filename.clone()));
    repository.create(&job).await.unwrap();

    let (sender, receiver) = mpsc::channel(1);
    let worker = PipelineWorker::new(
        receiver,
        svc,
        Arc::clone(&repository) as Arc<dyn JobRepository>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
    );

    sender
        .send(PipelineMessage {
            job_id: job.id,
            document,
            storage_path: staged.clone(),
            delete_after_processing: true,
        })
        .await
        .unwrap();
    drop(sender);

    worker.run().await;

    let finished = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.story_count, Some(1));
    assert!(store.get(&staged).is_none());
}

#[tokio::test]
async fn given_model_outage_when_worker_runs_then_job_marked_failed() {
    let store = Arc::new(MockArtifactStore::new());
    let repository = Arc::new(InMemoryJobRepository::new());
    let svc = Arc::new(service(Arc::new(FailingLlm), Arc::clone(&store)));

    let document = text_document(SAMPLE_DOC.len() as u64);
    let staged = StoragePath::staged(&document.id, &document.filename);
    store
        .store_bytes(&staged, Bytes::from_static(SAMPLE_DOC.as_bytes()))
        .await
        .unwrap();

    let job = Job::new(Some(document.id), Some(document.filename.clone()));
    repository.create(&job).await.unwrap();

    let (sender, receiver) = mpsc::channel(1);
    let worker = PipelineWorker::new(
        receiver,
        Arc::clone(&svc),
        Arc::clone(&repository) as Arc<dyn JobRepository>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
    );

    sender
        .send(PipelineMessage {
            job_id: job.id,
            document,
            storage_path: staged,
            delete_after_processing: false,
        })
        .await
        .unwrap();
    drop(sender);

    worker.run().await;

    let finished = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Failed);
    assert!(finished.error_message.is_some());
}
