use crate::application::ports::{LlmClient, LlmClientError};

/// Offline stand-in for the real model. Recognizes the three prompt
/// shapes the pipeline sends and answers each with canned JSON, so a
/// full run completes without network access.
pub struct MockLlmClient;

const CANNED_STORIES: &str = r#"[
  {
    "title": "Review Generated Backlog",
    "user_story": "As a product owner, I want to review the generated stories so that I can validate them against the source document",
    "description": "Placeholder story produced by the mock model.",
    "acceptance_criteria": [
      "Backlog export contains at least one story",
      "Each story lists its source chunk"
    ],
    "story_points": 3,
    "dependencies": [],
    "technical_notes": "Generated without calling a model."
  }
]"#;

const CANNED_MERGED_STORY: &str = r#"{
  "title": "Review Generated Backlog",
  "user_story": "As a product owner, I want to review the generated stories so that I can validate them against the source document",
  "description": "Placeholder story produced by the mock model.",
  "acceptance_criteria": [
    "Backlog export contains at least one story",
    "Each story lists its source chunk"
  ],
  "story_points": 3,
  "dependencies": [],
  "technical_notes": "Generated without calling a model."
}"#;

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, LlmClientError> {
        if user.contains("<candidate_pairs>") {
            Ok(r#"{"confirmed_duplicates": []}"#.to_string())
        } else if user.contains("<stories_to_merge>") {
            Ok(CANNED_MERGED_STORY.to_string())
        } else {
            Ok(CANNED_STORIES.to_string())
        }
    }
}
