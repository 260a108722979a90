use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::application::ports::LlmClient;
use crate::domain::Story;

use super::story_generation::strip_code_fences;
use super::story_merger::{extract_keywords, similarity};

const VERIFICATION_BATCH_SIZE: usize = 50;
const TITLE_SIMILARITY_THRESHOLD: f64 = 0.75;
const KEYWORD_MATCH_THRESHOLD: usize = 2;

const VERIFICATION_SYSTEM_PROMPT: &str = "You are an expert at identifying duplicate user stories. Be conservative - only mark as duplicates if they clearly describe the same feature.";

const MERGE_SYSTEM_PROMPT: &str = "You are an expert at merging duplicate user stories while preserving all important information.";

/// Duplicate elimination that stays cheap on large backlogs.
///
/// Candidate pairs are found with fast title heuristics, confirmed by
/// the model on lightweight payloads, then each confirmed group is
/// merged into a single story by the model. Every model failure has a
/// deterministic fallback, so merging never fails a job.
pub struct ScalableMerger {
    llm: Arc<dyn LlmClient>,
}

#[derive(Debug, Deserialize)]
struct VerificationResponse {
    #[serde(default)]
    confirmed_duplicates: Vec<VerifiedPair>,
}

#[derive(Debug, Deserialize)]
struct VerifiedPair {
    pair_id: String,
    #[serde(default)]
    is_duplicate: bool,
    #[serde(default)]
    reason: String,
}

impl ScalableMerger {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn merge(&self, stories: Vec<Story>) -> Vec<Story> {
        if stories.len() <= 1 {
            return stories;
        }

        let candidate_pairs = prefilter_candidates(&stories);
        tracing::info!(
            story_count = stories.len(),
            candidate_pairs = candidate_pairs.len(),
            "Prefiltered candidate duplicate pairs"
        );

        if candidate_pairs.is_empty() {
            return stories;
        }

        let confirmed = self.verify_candidates(&stories, &candidate_pairs).await;
        tracing::info!(confirmed_pairs = confirmed.len(), "Confirmed duplicate pairs");

        if confirmed.is_empty() {
            return stories;
        }

        let merged = self.merge_groups(stories, &confirmed).await;
        tracing::info!(remaining = merged.len(), "Duplicate merge complete");
        merged
    }

    async fn verify_candidates(
        &self,
        stories: &[Story],
        candidates: &[(usize, usize)],
    ) -> Vec<(usize, usize)> {
        let mut confirmed = Vec::new();

        for batch in candidates.chunks(VERIFICATION_BATCH_SIZE) {
            confirmed.extend(self.verify_batch(stories, batch).await);
        }

        confirmed
    }

    async fn verify_batch(
        &self,
        stories: &[Story],
        batch: &[(usize, usize)],
    ) -> Vec<(usize, usize)> {
        let payload: Vec<_> = batch
            .iter()
            .map(|&(i, j)| {
                json!({
                    "pair_id": format!("{i}-{j}"),
                    "story1": lightweight(&stories[i], i),
                    "story2": lightweight(&stories[j], j),
                })
            })
            .collect();

        let prompt = build_verification_prompt(&payload);

        match self.llm.complete(VERIFICATION_SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => match parse_verification(&raw) {
                Ok(confirmed) => confirmed,
                Err(e) => {
                    tracing::warn!(error = %e, "Unparseable verification response, accepting all candidates");
                    batch.to_vec()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Duplicate verification call failed, accepting all candidates");
                batch.to_vec()
            }
        }
    }

    async fn merge_groups(&self, stories: Vec<Story>, confirmed: &[(usize, usize)]) -> Vec<Story> {
        let groups = build_merge_groups(confirmed, stories.len());

        let mut slots: Vec<Option<Story>> = stories.into_iter().map(Some).collect();
        let mut merged_stories = Vec::with_capacity(groups.len());

        for group in groups {
            if group.len() == 1 {
                if let Some(story) = slots[group[0]].take() {
                    merged_stories.push(story);
                }
                continue;
            }

            let members: Vec<Story> = group.iter().filter_map(|&idx| slots[idx].take()).collect();
            if let Some(merged) = self.merge_one_group(members).await {
                tracing::debug!(into = %merged.title, "Merged duplicate group");
                merged_stories.push(merged);
            }
        }

        merged_stories
    }

    async fn merge_one_group(&self, members: Vec<Story>) -> Option<Story> {
        let mut provenance: Vec<usize> = Vec::new();
        for member in &members {
            for idx in member.chunk_provenance() {
                if !provenance.contains(&idx) {
                    provenance.push(idx);
                }
            }
        }
        provenance.sort_unstable();

        let mut merged = match self.call_llm_merge(&members).await {
            Ok(story) => story,
            Err(e) => {
                tracing::warn!(error = %e, "Group merge call failed, keeping first story");
                members.into_iter().next()?
            }
        };

        merged.merged_from_chunks = Some(provenance.len());
        merged.source_chunk_indexes = provenance;
        merged.source_chunk_index = None;
        Some(merged)
    }

    async fn call_llm_merge(&self, members: &[Story]) -> Result<Story, MergeCallError> {
        let prompt = build_merge_prompt(members)?;
        let raw = self.llm.complete(MERGE_SYSTEM_PROMPT, &prompt).await?;
        let story: Story = serde_json::from_str(strip_code_fences(&raw))?;
        Ok(story)
    }
}

#[derive(Debug, thiserror::Error)]
enum MergeCallError {
    #[error("llm: {0}")]
    Llm(#[from] crate::application::ports::LlmClientError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

fn lightweight(story: &Story, index: usize) -> serde_json::Value {
    let narrative: String = story.user_story.chars().take(200).collect();
    json!({
        "index": index,
        "title": story.title,
        "user_story": narrative,
    })
}

/// Pairwise title comparison. Cheap enough for thousands of stories and
/// deliberately loose, the model filters false positives afterwards.
fn prefilter_candidates(stories: &[Story]) -> Vec<(usize, usize)> {
    let mut candidates = Vec::new();

    for i in 0..stories.len() {
        for j in (i + 1)..stories.len() {
            if are_candidate_duplicates(&stories[i], &stories[j]) {
                candidates.push((i, j));
            }
        }
    }

    candidates
}

fn are_candidate_duplicates(a: &Story, b: &Story) -> bool {
    const STOPWORDS: &[&str] = &[
        "system",
        "implementation",
        "comprehensive",
        "basic",
        "simple",
        "advanced",
        "complete",
        "full",
        "management",
        "feature",
        "user",
        "users",
        "with",
        "from",
        "that",
        "this",
        "have",
        "has",
    ];

    let title_a = a.title_key();
    let title_b = b.title_key();

    if similarity(&title_a, &title_b) >= TITLE_SIMILARITY_THRESHOLD {
        return true;
    }

    let keywords_a = extract_keywords(&title_a, STOPWORDS);
    let keywords_b = extract_keywords(&title_b, STOPWORDS);
    keywords_a.intersection(&keywords_b).count() >= KEYWORD_MATCH_THRESHOLD
}

fn build_verification_prompt(pairs: &[serde_json::Value]) -> String {
    let rendered = serde_json::to_string_pretty(pairs).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"Analyze these candidate duplicate pairs and determine which are TRUE duplicates:

<candidate_pairs>
{rendered}
</candidate_pairs>

For each pair, return true/false indicating if they describe the SAME feature (even if worded differently).

Examples:
- "Audit Logging System" + "Comprehensive Audit Logging System" -> TRUE (same feature)
- "Email Registration" + "Email Verification" -> FALSE (different features)
- "Google OAuth" + "Facebook Login" -> FALSE (different providers)

Return JSON:
{{
  "confirmed_duplicates": [
    {{"pair_id": "12-19", "is_duplicate": true, "reason": "Both describe audit logging"}},
    {{"pair_id": "5-8", "is_duplicate": false, "reason": "Different aspects of profile"}}
  ]
}}

Return ONLY the JSON, no markdown."#
    )
}

fn build_merge_prompt(members: &[Story]) -> Result<String, serde_json::Error> {
    let rendered = serde_json::to_string_pretty(members)?;
    Ok(format!(
        r#"Merge these duplicate stories into one comprehensive story:

<stories_to_merge>
{rendered}
</stories_to_merge>

Merge strategy:
- Title: Choose the clearest, most concise title
- User Story: Keep the most detailed version
- Description: Combine both descriptions
- Acceptance Criteria: Union of all criteria (remove exact duplicates)
- Story Points: Take the highest estimate
- Dependencies: Union of all dependencies
- Technical Notes: Combine all notes

Return JSON:
{{
  "title": "...",
  "user_story": "...",
  "description": "...",
  "acceptance_criteria": [...],
  "story_points": 13,
  "dependencies": [...],
  "technical_notes": "..."
}}

Return ONLY the JSON."#
    ))
}

fn parse_verification(raw: &str) -> Result<Vec<(usize, usize)>, serde_json::Error> {
    let response: VerificationResponse = serde_json::from_str(strip_code_fences(raw))?;

    let mut confirmed = Vec::new();
    for item in response.confirmed_duplicates {
        if !item.is_duplicate {
            continue;
        }
        if let Some((left, right)) = item.pair_id.split_once('-') {
            if let (Ok(i), Ok(j)) = (left.parse::<usize>(), right.parse::<usize>()) {
                tracing::debug!(pair = %item.pair_id, reason = %item.reason, "Confirmed duplicate");
                confirmed.push((i, j));
            }
        }
    }

    Ok(confirmed)
}

/// Groups transitively connected pairs with union-find, so (1,2) plus
/// (2,3) merges all three. Groups come back ordered by their smallest
/// member, which keeps output order stable.
fn build_merge_groups(pairs: &[(usize, usize)], total: usize) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..total).collect();

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for &(i, j) in pairs {
        if i >= total || j >= total {
            continue;
        }
        let root_i = find(&mut parent, i);
        let root_j = find(&mut parent, j);
        if root_i != root_j {
            parent[root_i] = root_j;
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut root_to_group: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();

    for i in 0..total {
        let root = find(&mut parent, i);
        match root_to_group.get(&root) {
            Some(&slot) => groups[slot].push(i),
            None => {
                root_to_group.insert(root, groups.len());
                groups.push(vec![i]);
            }
        }
    }

    groups
}
