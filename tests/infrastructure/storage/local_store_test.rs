use bytes::Bytes;
use futures::stream;

use storyforge::application::ports::{ArtifactStore, ArtifactStoreError};
use storyforge::domain::{DocumentId, StoragePath};
use storyforge::infrastructure::storage::ObjectStoreAdapter;

fn local_store(dir: &tempfile::TempDir) -> impl ArtifactStore {
    ObjectStoreAdapter::local(dir.path().to_path_buf()).unwrap()
}

#[tokio::test]
async fn given_stored_bytes_when_fetched_then_content_matches() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);
    let path = StoragePath::staged(&DocumentId::new(), "spec.md");

    store
        .store_bytes(&path, Bytes::from_static(b"# Requirements"))
        .await
        .unwrap();

    let fetched = store.fetch(&path).await.unwrap();
    assert_eq!(fetched, b"# Requirements");
}

#[tokio::test]
async fn given_streamed_upload_when_stored_then_size_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);
    let path = StoragePath::staged(&DocumentId::new(), "spec.md");

    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"hello ")),
        Ok(Bytes::from_static(b"world")),
    ];
    let size = store
        .store(&path, Box::pin(stream::iter(chunks)), Some(11))
        .await
        .unwrap();

    assert_eq!(size, 11);
    assert_eq!(store.fetch(&path).await.unwrap(), b"hello world");
}

#[tokio::test]
async fn given_stored_object_when_head_then_returns_size() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);
    let path = StoragePath::staged(&DocumentId::new(), "spec.md");

    store
        .store_bytes(&path, Bytes::from_static(b"12345"))
        .await
        .unwrap();

    assert_eq!(store.head(&path).await.unwrap(), 5);
}

#[tokio::test]
async fn given_missing_object_when_fetched_then_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);
    let path = StoragePath::from_raw("missing/object.json");

    let result = store.fetch(&path).await;
    assert!(matches!(result, Err(ArtifactStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_deleted_object_when_fetched_then_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);
    let path = StoragePath::staged(&DocumentId::new(), "spec.md");

    store
        .store_bytes(&path, Bytes::from_static(b"data"))
        .await
        .unwrap();
    store.delete(&path).await.unwrap();

    assert!(matches!(
        store.fetch(&path).await,
        Err(ArtifactStoreError::NotFound(_))
    ));
}
