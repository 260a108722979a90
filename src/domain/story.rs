use serde::{Deserialize, Serialize};

/// A user story in INVEST shape. Deserialization accepts the key
/// variations LLMs produce (camelCase, shorthand names); anything
/// missing a title, narrative, or criteria fails to parse and is
/// dropped upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Assigned during aggregation as `STORY-NNN`; absent before that.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(alias = "userStory", alias = "user_story_text")]
    pub user_story: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "acceptanceCriteria", alias = "criteria")]
    pub acceptance_criteria: Vec<String>,
    #[serde(default, alias = "storyPoints", alias = "points")]
    pub story_points: u32,
    /// Free-text titles of stories this one depends on, as written by
    /// the model. Resolved to ids during aggregation.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_ids: Vec<String>,
    #[serde(default, alias = "technicalNotes", alias = "notes")]
    pub technical_notes: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chunk_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_chunk_indexes: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_from_chunks: Option<usize>,
}

impl Story {
    /// Lowercased, trimmed title used for duplicate detection.
    pub fn title_key(&self) -> String {
        self.title.trim().to_lowercase()
    }

    /// Chunk indexes this story was derived from, whether or not it has
    /// been merged yet.
    pub fn chunk_provenance(&self) -> Vec<usize> {
        if !self.source_chunk_indexes.is_empty() {
            self.source_chunk_indexes.clone()
        } else {
            self.source_chunk_index.into_iter().collect()
        }
    }
}
