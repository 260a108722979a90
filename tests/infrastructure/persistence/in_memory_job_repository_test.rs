use storyforge::application::ports::{JobRepository, RepositoryError};
use storyforge::domain::{DocumentId, Job, JobId, JobStatus};
use storyforge::infrastructure::persistence::InMemoryJobRepository;

fn new_job() -> Job {
    Job::new(Some(DocumentId::new()), Some("spec.md".to_string()))
}

#[tokio::test]
async fn given_created_job_when_fetched_then_returned() {
    let repo = InMemoryJobRepository::new();
    let job = new_job();

    repo.create(&job).await.unwrap();
    let fetched = repo.get_by_id(job.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, job.id);
    assert_eq!(fetched.status, JobStatus::Queued);
}

#[tokio::test]
async fn given_unknown_id_when_fetched_then_none() {
    let repo = InMemoryJobRepository::new();
    assert!(repo.get_by_id(JobId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn given_status_update_when_applied_then_status_and_message_change() {
    let repo = InMemoryJobRepository::new();
    let job = new_job();
    repo.create(&job).await.unwrap();

    repo.update_status(job.id, JobStatus::Failed, Some("model unavailable"))
        .await
        .unwrap();

    let fetched = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Failed);
    assert_eq!(fetched.error_message.as_deref(), Some("model unavailable"));
    assert!(fetched.updated_at >= fetched.created_at);
}

#[tokio::test]
async fn given_unknown_id_when_updating_then_not_found() {
    let repo = InMemoryJobRepository::new();
    let result = repo.update_status(JobId::new(), JobStatus::Failed, None).await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn given_story_count_when_set_then_persisted() {
    let repo = InMemoryJobRepository::new();
    let job = new_job();
    repo.create(&job).await.unwrap();

    repo.set_story_count(job.id, 42).await.unwrap();

    let fetched = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.story_count, Some(42));
}

#[tokio::test]
async fn given_mixed_statuses_when_listed_then_only_matching_returned() {
    let repo = InMemoryJobRepository::new();
    let queued = new_job();
    let failed = new_job();
    repo.create(&queued).await.unwrap();
    repo.create(&failed).await.unwrap();
    repo.update_status(failed.id, JobStatus::Failed, Some("boom"))
        .await
        .unwrap();

    let listed = repo.list_by_status(JobStatus::Queued).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, queued.id);
}
