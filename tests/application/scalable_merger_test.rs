use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use storyforge::application::ports::{LlmClient, LlmClientError};
use storyforge::application::services::ScalableMerger;
use storyforge::domain::Story;

fn story(title: &str, chunk: usize) -> Story {
    serde_json::from_value(serde_json::json!({
        "title": title,
        "user_story": format!("As a user, I want {} so that the product improves", title.to_lowercase()),
        "acceptance_criteria": ["Criterion one"],
        "story_points": 3,
        "source_chunk_index": chunk,
    }))
    .unwrap()
}

/// Answers verification and merge prompts with fixed payloads and
/// counts how often it was called.
struct ScriptedLlm {
    verification: String,
    merge: String,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn new(verification: &str, merge: &str) -> Arc<Self> {
        Arc::new(Self {
            verification: verification.to_string(),
            merge: merge.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, LlmClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if user.contains("<candidate_pairs>") {
            Ok(self.verification.clone())
        } else if user.contains("<stories_to_merge>") {
            Ok(self.merge.clone())
        } else {
            Err(LlmClientError::InvalidResponse("unexpected prompt".into()))
        }
    }
}

struct FailingLlm;

#[async_trait::async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmClientError> {
        Err(LlmClientError::ApiRequestFailed("boom".to_string()))
    }
}

const MERGED_STORY: &str = r#"{
    "title": "Audit Logging",
    "user_story": "As an admin, I want audit logging so that access is traceable",
    "acceptance_criteria": ["Admin actions are logged"],
    "story_points": 5
}"#;

#[tokio::test]
async fn given_single_story_when_merged_then_model_never_called() {
    let llm = ScriptedLlm::new("{}", "{}");
    let merger = ScalableMerger::new(llm.clone());

    let merged = merger.merge(vec![story("Audit Logging", 0)]).await;

    assert_eq!(merged.len(), 1);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_unrelated_titles_when_merged_then_no_candidates_and_no_calls() {
    let llm = ScriptedLlm::new("{}", "{}");
    let merger = ScalableMerger::new(llm.clone());

    let merged = merger
        .merge(vec![
            story("Email Registration", 0),
            story("Invoice Export", 1),
        ])
        .await;

    assert_eq!(merged.len(), 2);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_confirmed_pair_when_merged_then_group_collapses_to_one() {
    let verification = r#"{
        "confirmed_duplicates": [
            {"pair_id": "0-1", "is_duplicate": true, "reason": "Same feature"}
        ]
    }"#;
    let merger = ScalableMerger::new(ScriptedLlm::new(verification, MERGED_STORY));

    let merged = merger
        .merge(vec![
            story("Audit Logging", 0),
            story("Comprehensive Audit Logging", 2),
        ])
        .await;

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].title, "Audit Logging");
    assert_eq!(merged[0].source_chunk_indexes, vec![0, 2]);
    assert_eq!(merged[0].merged_from_chunks, Some(2));
}

#[tokio::test]
async fn given_rejected_pair_when_merged_then_stories_kept_apart() {
    let verification = r#"{
        "confirmed_duplicates": [
            {"pair_id": "0-1", "is_duplicate": false, "reason": "Different providers"}
        ]
    }"#;
    let merger = ScalableMerger::new(ScriptedLlm::new(verification, MERGED_STORY));

    let merged = merger
        .merge(vec![
            story("Audit Logging", 0),
            story("Comprehensive Audit Logging", 1),
        ])
        .await;

    assert_eq!(merged.len(), 2);
}

#[tokio::test]
async fn given_model_outage_when_merged_then_fallbacks_still_deduplicate() {
    let merger = ScalableMerger::new(Arc::new(FailingLlm));

    let merged = merger
        .merge(vec![
            story("Audit Logging", 0),
            story("Comprehensive Audit Logging", 1),
            story("Invoice Export", 2),
        ])
        .await;

    // Verification falls back to accepting candidates; the group merge
    // falls back to keeping the first story of the group.
    assert_eq!(merged.len(), 2);
    let titles: Vec<&str> = merged.iter().map(|s| s.title.as_str()).collect();
    assert!(titles.contains(&"Audit Logging"));
    assert!(titles.contains(&"Invoice Export"));
}

#[tokio::test]
async fn given_transitive_pairs_when_merged_then_all_three_collapse() {
    let verification = r#"{
        "confirmed_duplicates": [
            {"pair_id": "0-1", "is_duplicate": true, "reason": "Same"},
            {"pair_id": "1-2", "is_duplicate": true, "reason": "Same"}
        ]
    }"#;
    let merger = ScalableMerger::new(ScriptedLlm::new(verification, MERGED_STORY));

    let merged = merger
        .merge(vec![
            story("Audit Logging", 0),
            story("Comprehensive Audit Logging", 1),
            story("Audit Logging System", 2),
        ])
        .await;

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].source_chunk_indexes, vec![0, 1, 2]);
}
