use std::collections::{BTreeSet, HashMap};

use serde_json::{json, Value};

use crate::domain::Story;

/// Rendered export artifacts for one finished backlog.
pub struct BacklogExports {
    pub stories_json: String,
    pub jira_json: String,
    pub summary: String,
    pub story_count: usize,
}

/// Assigns stable `STORY-NNN` ids, resolves free-text dependency titles
/// to those ids, and orders the backlog so that every story comes after
/// the stories it depends on.
pub fn process_stories(mut stories: Vec<Story>) -> Vec<Story> {
    for (idx, story) in stories.iter_mut().enumerate() {
        story.id = Some(format!("STORY-{:03}", idx + 1));
    }

    let title_to_id: HashMap<String, String> = stories
        .iter()
        .filter_map(|s| s.id.clone().map(|id| (s.title.clone(), id)))
        .collect();

    for story in stories.iter_mut() {
        if story.dependencies.is_empty() {
            continue;
        }
        // Unresolvable titles are kept verbatim so nothing silently
        // disappears from the export.
        story.dependency_ids = story
            .dependencies
            .iter()
            .map(|dep| title_to_id.get(dep).cloned().unwrap_or_else(|| dep.clone()))
            .collect();
    }

    topological_sort(stories)
}

/// Kahn's algorithm over the dependency graph. Ties break on original
/// position so the output is deterministic. Stories caught in a
/// dependency cycle are appended in their original order rather than
/// dropped.
fn topological_sort(stories: Vec<Story>) -> Vec<Story> {
    let id_to_index: HashMap<String, usize> = stories
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.id.clone().map(|id| (id, i)))
        .collect();

    let n = stories.len();
    let mut indegree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (i, story) in stories.iter().enumerate() {
        for dep_id in &story.dependency_ids {
            if let Some(&j) = id_to_index.get(dep_id) {
                if j != i {
                    dependents[j].push(i);
                    indegree[i] += 1;
                }
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(n);

    while let Some(&i) = ready.iter().next() {
        ready.remove(&i);
        order.push(i);
        for &dep in &dependents[i] {
            indegree[dep] -= 1;
            if indegree[dep] == 0 {
                ready.insert(dep);
            }
        }
    }

    if order.len() < n {
        let stuck: Vec<usize> = (0..n).filter(|i| !order.contains(i)).collect();
        tracing::warn!(
            cycle_members = stuck.len(),
            "Dependency cycle detected, appending affected stories in input order"
        );
        order.extend(stuck);
    }

    let mut slots: Vec<Option<Story>> = stories.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

pub fn build_exports(stories: &[Story]) -> Result<BacklogExports, serde_json::Error> {
    Ok(BacklogExports {
        stories_json: serde_json::to_string_pretty(stories)?,
        jira_json: serde_json::to_string_pretty(&to_jira_format(stories))?,
        summary: render_summary(stories),
        story_count: stories.len(),
    })
}

/// Jira CSV import columns mapped onto JSON.
fn to_jira_format(stories: &[Story]) -> Value {
    let issues: Vec<Value> = stories
        .iter()
        .map(|story| {
            let criteria = story
                .acceptance_criteria
                .iter()
                .map(|ac| format!("- {ac}"))
                .collect::<Vec<_>>()
                .join("\n");

            json!({
                "Summary": story.title,
                "Description": story.user_story,
                "Issue Type": "Story",
                "Story Points": story.story_points,
                "Acceptance Criteria": criteria,
                "Labels": story.labels,
                "Custom Fields": {
                    "Technical Notes": story.technical_notes,
                    "Dependencies": story.dependency_ids,
                },
            })
        })
        .collect();

    json!({ "issues": issues })
}

fn render_summary(stories: &[Story]) -> String {
    let total_points: u32 = stories.iter().map(|s| s.story_points).sum();
    let rule = "=".repeat(80);

    let mut lines = vec![
        rule.clone(),
        "User Stories Summary".to_string(),
        rule.clone(),
        format!("\nTotal Stories: {}", stories.len()),
        format!("Total Story Points: {total_points}"),
        format!("\n{rule}"),
        "\nStories in delivery order:\n".to_string(),
    ];

    for story in stories {
        lines.push(format!(
            "\n{}: {}",
            story.id.as_deref().unwrap_or("N/A"),
            story.title
        ));
        lines.push(format!("  Points: {}", story.story_points));
        lines.push(format!("  Story: {}", story.user_story));

        if !story.acceptance_criteria.is_empty() {
            lines.push("  Acceptance Criteria:".to_string());
            for ac in &story.acceptance_criteria {
                lines.push(format!("    - {ac}"));
            }
        }

        if !story.dependency_ids.is_empty() {
            lines.push(format!("  Dependencies: {}", story.dependency_ids.join(", ")));
        }

        lines.push(String::new());
    }

    lines.join("\n")
}
