use std::sync::Arc;

use storyforge::application::ports::{LlmClient, LlmClientError};
use storyforge::application::services::StoryGenerator;
use storyforge::domain::{Chunk, DocumentId};

struct StubLlm {
    response: Result<String, LlmClientError>,
}

impl StubLlm {
    fn returning(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response.to_string()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: Err(LlmClientError::RateLimited),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmClientError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(LlmClientError::RateLimited) => Err(LlmClientError::RateLimited),
            Err(e) => Err(LlmClientError::ApiRequestFailed(e.to_string())),
        }
    }
}

fn chunk(index: usize) -> Chunk {
    Chunk::new(
        "Users must be able to register with an email address.".to_string(),
        DocumentId::new(),
        index,
        0,
    )
}

const VALID_STORY: &str = r#"{
    "title": "Email Registration",
    "user_story": "As a visitor, I want to register with my email so that I can access the product",
    "acceptance_criteria": ["Email format is validated"],
    "story_points": 3
}"#;

#[tokio::test]
async fn given_bare_array_when_generating_then_stories_parsed_and_tagged() {
    let generator = StoryGenerator::new(StubLlm::returning(&format!("[{VALID_STORY}]")));

    let stories = generator.generate(&chunk(2)).await.unwrap();

    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].title, "Email Registration");
    assert_eq!(stories[0].source_chunk_index, Some(2));
}

#[tokio::test]
async fn given_fenced_output_when_generating_then_fences_stripped() {
    let fenced = format!("```json\n[{VALID_STORY}]\n```");
    let generator = StoryGenerator::new(StubLlm::returning(&fenced));

    let stories = generator.generate(&chunk(0)).await.unwrap();
    assert_eq!(stories.len(), 1);
}

#[tokio::test]
async fn given_stories_wrapper_object_when_generating_then_array_unwrapped() {
    let wrapped = format!(r#"{{"stories": [{VALID_STORY}]}}"#);
    let generator = StoryGenerator::new(StubLlm::returning(&wrapped));

    let stories = generator.generate(&chunk(0)).await.unwrap();
    assert_eq!(stories.len(), 1);
}

#[tokio::test]
async fn given_single_object_when_generating_then_treated_as_one_story() {
    let generator = StoryGenerator::new(StubLlm::returning(VALID_STORY));

    let stories = generator.generate(&chunk(0)).await.unwrap();
    assert_eq!(stories.len(), 1);
}

#[tokio::test]
async fn given_malformed_entry_when_generating_then_entry_dropped_not_fatal() {
    let mixed = format!(r#"[{VALID_STORY}, {{"user_story": "missing title"}}]"#);
    let generator = StoryGenerator::new(StubLlm::returning(&mixed));

    let stories = generator.generate(&chunk(0)).await.unwrap();
    assert_eq!(stories.len(), 1);
}

#[tokio::test]
async fn given_story_without_criteria_when_generating_then_story_dropped() {
    let no_criteria = r#"[{
        "title": "Vague Idea",
        "user_story": "As a user, I want something",
        "acceptance_criteria": []
    }]"#;
    let generator = StoryGenerator::new(StubLlm::returning(no_criteria));

    let stories = generator.generate(&chunk(0)).await.unwrap();
    assert!(stories.is_empty());
}

#[tokio::test]
async fn given_empty_array_when_generating_then_no_stories() {
    let generator = StoryGenerator::new(StubLlm::returning("[]"));

    let stories = generator.generate(&chunk(0)).await.unwrap();
    assert!(stories.is_empty());
}

#[tokio::test]
async fn given_non_json_output_when_generating_then_returns_parse_error() {
    let generator = StoryGenerator::new(StubLlm::returning("I could not find any requirements."));

    assert!(generator.generate(&chunk(0)).await.is_err());
}

#[tokio::test]
async fn given_llm_failure_when_generating_then_error_propagates() {
    let generator = StoryGenerator::new(StubLlm::failing());

    assert!(generator.generate(&chunk(0)).await.is_err());
}

#[tokio::test]
async fn given_camel_case_model_output_when_generating_then_aliases_accepted() {
    let camel = r#"[{
        "title": "Email Registration",
        "userStory": "As a visitor, I want to register",
        "acceptanceCriteria": ["Email format is validated"],
        "storyPoints": 3
    }]"#;
    let generator = StoryGenerator::new(StubLlm::returning(camel));

    let stories = generator.generate(&chunk(0)).await.unwrap();
    assert_eq!(stories[0].story_points, 3);
    assert_eq!(stories[0].acceptance_criteria.len(), 1);
}
