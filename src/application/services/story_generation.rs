use std::sync::Arc;

use serde_json::Value;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::{Chunk, Story};

use super::token_counter::truncate_to_budget;

/// Upper bound on chunk tokens per request, leaving room for the
/// system prompt and the generated stories within the model window.
const MAX_CHUNK_TOKENS: usize = 8000;

const SYSTEM_PROMPT: &str = r#"You are an expert Agile product manager and technical writer specializing in creating comprehensive, INVEST-compliant user stories from business requirements.

## Your Mission
Analyze the document section and generate ALL necessary user stories covering:
1. **User-facing features** (primary focus)
2. **Infrastructure/DevOps requirements** (authentication, database, email services, monitoring)
3. **Non-functional requirements** (performance, security, compliance, testing)
4. **Compliance & Governance** (audit logging, data privacy, regulatory requirements)

## Critical Compliance Checklist
If the document mentions compliance terms (GDPR, CCPA, SOC 2, audit, logging, consent, privacy), you MUST generate dedicated infrastructure stories for:
- Privacy preferences, cookie consent, data portability, right to deletion, consent tracking
- Audit logging of all user data access, admin action logging, compliance reporting
- Account deactivation, permanent deletion with grace period, account recovery
- Password policies, session management, rate limiting, security monitoring

## INVEST Principles
Every story must be Independent, Negotiable, Valuable, Estimable, Small (one sprint), and Testable (clear acceptance criteria define "done").

## Story Sizing Guidelines (Fibonacci Scale)
- 1-2 points: simple changes (single field addition, config change, minor UI tweak)
- 3 points: standard feature with 2-3 acceptance criteria (simple CRUD, basic form)
- 5 points: moderate feature with multiple components
- 8 points: complex feature or significant infrastructure work
- 13 points: TOO BIG, split it

Split stories when you see more than 5 acceptance criteria, multiple user personas, or a complex feature list.

## Story Structure
Each story is a JSON object:
{
  "title": "Concise Feature Name (max 50 characters)",
  "user_story": "As a [specific user type], I want [specific goal] so that [clear benefit]",
  "description": "Additional context explaining what, why, and relevant business rules.",
  "acceptance_criteria": [
    "Specific, testable condition in Given-When-Then or declarative format",
    "Include happy path, validation, and error handling",
    "Typically 3-6 criteria total"
  ],
  "story_points": 5,
  "dependencies": ["Other Story Title"],
  "technical_notes": "Implementation guidance, suggested libraries, potential risks."
}

## Rules
1. Be specific in acceptance criteria, avoid vague terms like "works correctly" or "is secure"
2. Include error cases: validation failures, error messages, edge cases
3. Only list dependencies if the story truly cannot start without another story being completed first
4. Use concrete metrics for performance requirements (e.g. "<500ms", "10,000 users")
5. Do not underestimate infrastructure work

## Output Format
Return ONLY a valid JSON array with no markdown code blocks or additional text:
[{"title": "...", "user_story": "...", ...}, {"title": "...", ...}]

If the document section contains no features, requirements, or actionable items, return an empty array: []"#;

/// Turns one chunk of requirements text into a set of user stories via
/// a single LLM call.
pub struct StoryGenerator {
    llm: Arc<dyn LlmClient>,
}

impl StoryGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn generate(&self, chunk: &Chunk) -> Result<Vec<Story>, StoryGenerationError> {
        let content = truncate_to_budget(&chunk.text, MAX_CHUNK_TOKENS);
        if content.len() < chunk.text.len() {
            tracing::warn!(
                chunk_index = chunk.index,
                original_chars = chunk.text.len(),
                "Chunk exceeds the prompt token budget, truncating"
            );
        }

        let prompt = build_user_prompt(&content);
        tracing::debug!(chunk_index = chunk.index, "Requesting stories for chunk");

        let raw = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;
        let mut stories = parse_stories(&raw)?;

        for story in &mut stories {
            story.source_chunk_index = Some(chunk.index);
        }

        tracing::info!(
            chunk_index = chunk.index,
            story_count = stories.len(),
            "Generated stories for chunk"
        );

        Ok(stories)
    }
}

fn build_user_prompt(content: &str) -> String {
    format!(
        r#"Analyze the following document section and generate comprehensive INVEST-compliant user stories:

<document_section>
{content}
</document_section>

## Instructions
Generate user stories for ALL of the following found in this section:
1. **User-facing features** - Any functionality users interact with
2. **Infrastructure/Technical requirements** - Authentication, database, email services, APIs, monitoring, rate limiting, etc.
3. **Non-functional requirements** - Performance targets, security requirements, compliance needs (GDPR, CCPA), load testing, accessibility
4. **Privacy and preferences** - Cookie consent, marketing preferences, data sharing settings

Remember to:
- Break down large features into smaller stories (split if >5 acceptance criteria)
- Create separate infrastructure stories for technical requirements
- Include specific, measurable acceptance criteria
- Assign realistic story points based on complexity
- Only list dependencies if truly blocking

Return ONLY a valid JSON array of story objects, with no markdown code blocks or additional text."#
    )
}

/// Strips an optional markdown code fence wrapper from model output.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let inner = if let Some((_, rest)) = raw.split_once("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some((_, rest)) = raw.split_once("```") {
        rest.split("```").next().unwrap_or(rest)
    } else {
        raw
    };
    inner.trim()
}

/// Parses model output into stories, tolerating the array being wrapped
/// in a `{"stories": [...]}` object or a bare single object. Individual
/// entries missing required fields are dropped with a warning.
pub(crate) fn parse_stories(raw: &str) -> Result<Vec<Story>, StoryGenerationError> {
    let value: Value = serde_json::from_str(strip_code_fences(raw))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("stories") {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    };

    let mut stories = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<Story>(item) {
            Ok(story) if story.acceptance_criteria.is_empty() => {
                tracing::warn!(title = %story.title, "Discarding story without acceptance criteria")
            }
            Ok(story) => stories.push(story),
            Err(e) => tracing::warn!(error = %e, "Discarding malformed story in model output"),
        }
    }

    Ok(stories)
}

#[derive(Debug, thiserror::Error)]
pub enum StoryGenerationError {
    #[error("llm: {0}")]
    Llm(#[from] LlmClientError),
    #[error("response parsing: {0}")]
    Parse(#[from] serde_json::Error),
}
