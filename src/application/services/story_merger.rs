use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use strsim::normalized_levenshtein;

use crate::domain::Story;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w{3,}\b").unwrap());
static BULLET_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-•*\s]+").unwrap());

const CRITERIA_MATCH_SIMILARITY: f64 = 0.75;
const CONCEPT_MATCH_MIN_SIMILARITY: f64 = 0.6;
const CONCEPT_WORD_OVERLAP: f64 = 0.6;
const CONCEPT_CRITERIA_OVERLAP: f64 = 0.3;

/// Heuristic duplicate detection and merging for small story sets.
///
/// Two stories count as duplicates when their titles are nearly
/// identical, or when moderately similar titles come with overlapping
/// acceptance criteria, or when the titles share a core concept and the
/// criteria still overlap somewhat.
pub struct StoryMerger {
    title_similarity_threshold: f64,
    criteria_overlap_threshold: f64,
    fuzzy_title_threshold: f64,
}

impl Default for StoryMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryMerger {
    pub fn new() -> Self {
        Self::with_thresholds(0.85, 0.5, 0.70)
    }

    pub fn with_thresholds(
        title_similarity_threshold: f64,
        criteria_overlap_threshold: f64,
        fuzzy_title_threshold: f64,
    ) -> Self {
        Self {
            title_similarity_threshold,
            criteria_overlap_threshold,
            fuzzy_title_threshold,
        }
    }

    pub fn merge(&self, stories: Vec<Story>) -> Vec<Story> {
        let mut unique: Vec<Story> = Vec::with_capacity(stories.len());
        let mut merged_count = 0usize;

        for story in stories {
            let duplicate_of = unique
                .iter()
                .position(|existing| self.are_duplicates(&story, existing));

            match duplicate_of {
                Some(idx) => {
                    tracing::debug!(
                        merged = %story.title,
                        into = %unique[idx].title,
                        "Merging duplicate story"
                    );
                    merge_into_existing(&mut unique[idx], story);
                    merged_count += 1;
                }
                None => unique.push(story),
            }
        }

        if merged_count > 0 {
            tracing::info!(merged_count, remaining = unique.len(), "Merged duplicate stories");
        }

        unique
    }

    fn are_duplicates(&self, a: &Story, b: &Story) -> bool {
        let title_a = a.title_key();
        let title_b = b.title_key();

        let title_sim = similarity(&title_a, &title_b);
        if title_sim >= self.title_similarity_threshold {
            return true;
        }

        if title_sim >= self.fuzzy_title_threshold {
            let overlap = criteria_overlap(&a.acceptance_criteria, &b.acceptance_criteria);
            if overlap >= self.criteria_overlap_threshold {
                return true;
            }
        }

        if titles_share_core_concept(&title_a, &title_b) {
            let overlap = criteria_overlap(&a.acceptance_criteria, &b.acceptance_criteria);
            if overlap >= CONCEPT_CRITERIA_OVERLAP {
                return true;
            }
        }

        false
    }
}

pub(crate) fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

pub(crate) fn extract_keywords(text: &str, stopwords: &[&str]) -> HashSet<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|w| !stopwords.contains(&w.as_str()))
        .collect()
}

fn normalize_criterion(criterion: &str) -> String {
    BULLET_PREFIX_RE
        .replace(criterion, "")
        .to_lowercase()
        .trim()
        .to_string()
}

/// Fuzzy Jaccard overlap of two acceptance criteria lists. Criteria
/// match when nearly identical or when their keyword sets mostly agree.
fn criteria_overlap(criteria_a: &[String], criteria_b: &[String]) -> f64 {
    if criteria_a.is_empty() || criteria_b.is_empty() {
        return 0.0;
    }

    let norm_a: Vec<String> = criteria_a.iter().map(|c| normalize_criterion(c)).collect();
    let norm_b: Vec<String> = criteria_b.iter().map(|c| normalize_criterion(c)).collect();

    let mut matched_pairs = 0usize;
    let mut used: HashSet<usize> = HashSet::new();

    for a in &norm_a {
        let mut best_score = 0.0f64;
        let mut best_idx: Option<usize> = None;

        for (idx, b) in norm_b.iter().enumerate() {
            if used.contains(&idx) {
                continue;
            }
            let score = similarity(a, b);
            // Shared keywords alone are not enough; the wording still
            // has to be reasonably close.
            let concept_match =
                score > CONCEPT_MATCH_MIN_SIMILARITY && criteria_share_concepts(a, b);
            if (score > CRITERIA_MATCH_SIMILARITY || concept_match) && score > best_score {
                best_score = score;
                best_idx = Some(idx);
            }
        }

        if let Some(idx) = best_idx {
            matched_pairs += 1;
            used.insert(idx);
        }
    }

    let total = criteria_a.len() + criteria_b.len() - matched_pairs;
    if total > 0 {
        matched_pairs as f64 / total as f64
    } else {
        0.0
    }
}

fn criteria_share_concepts(a: &str, b: &str) -> bool {
    const COMMON: &[&str] = &[
        "all", "the", "and", "for", "with", "from", "that", "this", "are", "have",
    ];
    let words_a = extract_keywords(a, COMMON);
    let words_b = extract_keywords(b, COMMON);

    if words_a.is_empty() || words_b.is_empty() {
        return false;
    }

    let overlap = words_a.intersection(&words_b).count();
    let min_words = words_a.len().min(words_b.len());
    overlap as f64 / min_words as f64 >= CONCEPT_WORD_OVERLAP
}

/// "Audit Logging" and "Comprehensive Audit Logging" name the same
/// feature; generic filler words do not count toward the overlap.
fn titles_share_core_concept(title_a: &str, title_b: &str) -> bool {
    const GENERIC: &[&str] = &[
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
    ];
    let words_a = extract_keywords(title_a, GENERIC);
    let words_b = extract_keywords(title_b, GENERIC);
    words_a.intersection(&words_b).count() >= 2
}

fn is_too_generic(title: &str) -> bool {
    static ANY_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());
    const GENERIC_ONLY: &[&str] = &["system", "feature", "implementation", "management"];

    let lowered = title.to_lowercase();
    let mut words = ANY_WORD_RE.find_iter(&lowered).peekable();
    words.peek().is_some() && words.all(|m| GENERIC_ONLY.contains(&m.as_str()))
}

fn merge_into_existing(existing: &mut Story, new: Story) {
    // Shorter title tends to be the clearer one, unless it is all filler.
    if new.title.len() < existing.title.len() && !is_too_generic(&new.title) {
        existing.title = new.title.clone();
    }

    if new.user_story.len() > existing.user_story.len() {
        existing.user_story = new.user_story.clone();
    }

    if !new.description.is_empty() && !existing.description.contains(&new.description) {
        existing.description = combine_text(
            &existing.description,
            &new.description,
            "\n\nAdditional context: ",
        );
    }

    existing.acceptance_criteria =
        merge_acceptance_criteria(&existing.acceptance_criteria, &new.acceptance_criteria);

    existing.story_points = existing.story_points.max(new.story_points);

    for dep in &new.dependencies {
        if !existing.dependencies.contains(dep) {
            existing.dependencies.push(dep.clone());
        }
    }
    existing.dependencies.sort();

    existing.technical_notes = combine_text(
        &existing.technical_notes,
        &new.technical_notes,
        "\n\nAdditional notes:\n",
    );

    let mut chunks = existing.chunk_provenance();
    for idx in new.chunk_provenance() {
        if !chunks.contains(&idx) {
            chunks.push(idx);
        }
    }
    existing.merged_from_chunks = Some(chunks.len());
    existing.source_chunk_indexes = chunks;
    existing.source_chunk_index = None;
}

fn combine_text(a: &str, b: &str, separator: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    if b.is_empty() || a.contains(b) {
        return a.to_string();
    }
    if b.contains(a) {
        return b.to_string();
    }
    format!("{a}{separator}{b}")
}

/// Union of two criteria lists. Nearly identical entries collapse into
/// one, keeping the more detailed wording.
fn merge_acceptance_criteria(criteria_a: &[String], criteria_b: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = criteria_a.to_vec();

    for criterion in criteria_b {
        let norm_new = normalize_criterion(criterion);
        let mut duplicate = false;

        for existing in merged.iter_mut() {
            if similarity(&norm_new, &normalize_criterion(existing)) > 0.85 {
                if criterion.len() > existing.len() {
                    *existing = criterion.clone();
                }
                duplicate = true;
                break;
            }
        }

        if !duplicate {
            merged.push(criterion.clone());
        }
    }

    merged
}
