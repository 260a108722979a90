use storyforge::domain::Story;

#[test]
fn given_snake_case_json_when_deserialized_then_all_fields_populate() {
    let json = r#"{
        "title": "User Registration",
        "user_story": "As a visitor, I want to register so that I can log in",
        "description": "Covers the signup form",
        "acceptance_criteria": ["Email is validated", "Password meets policy"],
        "story_points": 5,
        "dependencies": ["Email Service Setup"],
        "technical_notes": "Use bcrypt"
    }"#;

    let story: Story = serde_json::from_str(json).unwrap();
    assert_eq!(story.title, "User Registration");
    assert_eq!(story.story_points, 5);
    assert_eq!(story.acceptance_criteria.len(), 2);
    assert_eq!(story.dependencies, vec!["Email Service Setup"]);
}

#[test]
fn given_camel_case_json_when_deserialized_then_aliases_apply() {
    let json = r#"{
        "title": "Password Reset",
        "userStory": "As a user, I want to reset my password so that I can regain access",
        "acceptanceCriteria": ["Reset email is sent"],
        "storyPoints": 3,
        "technicalNotes": "Token expires after 1 hour"
    }"#;

    let story: Story = serde_json::from_str(json).unwrap();
    assert_eq!(story.user_story.starts_with("As a user"), true);
    assert_eq!(story.acceptance_criteria, vec!["Reset email is sent"]);
    assert_eq!(story.story_points, 3);
    assert_eq!(story.technical_notes, "Token expires after 1 hour");
}

#[test]
fn given_minimal_json_when_deserialized_then_defaults_fill_in() {
    let json = r#"{
        "title": "Audit Logging",
        "user_story": "As an admin, I want audit logs so that access is traceable",
        "acceptance_criteria": []
    }"#;

    let story: Story = serde_json::from_str(json).unwrap();
    assert_eq!(story.story_points, 0);
    assert!(story.dependencies.is_empty());
    assert!(story.description.is_empty());
    assert!(story.id.is_none());
}

#[test]
fn given_json_without_title_when_deserialized_then_fails() {
    let json = r#"{"user_story": "As a user", "acceptance_criteria": []}"#;
    assert!(serde_json::from_str::<Story>(json).is_err());
}

#[test]
fn given_padded_mixed_case_title_when_keyed_then_normalized() {
    let json = r#"{
        "title": "  Audit Logging  ",
        "user_story": "As an admin",
        "acceptance_criteria": []
    }"#;
    let story: Story = serde_json::from_str(json).unwrap();
    assert_eq!(story.title_key(), "audit logging");
}

#[test]
fn given_unmerged_story_when_asked_for_provenance_then_uses_single_index() {
    let json = r#"{
        "title": "A",
        "user_story": "As a user",
        "acceptance_criteria": [],
        "source_chunk_index": 4
    }"#;
    let story: Story = serde_json::from_str(json).unwrap();
    assert_eq!(story.chunk_provenance(), vec![4]);
}

#[test]
fn given_merged_story_when_asked_for_provenance_then_uses_index_list() {
    let json = r#"{
        "title": "A",
        "user_story": "As a user",
        "acceptance_criteria": [],
        "source_chunk_index": 4,
        "source_chunk_indexes": [1, 2]
    }"#;
    let story: Story = serde_json::from_str(json).unwrap();
    assert_eq!(story.chunk_provenance(), vec![1, 2]);
}

#[test]
fn given_story_without_id_when_serialized_then_optional_fields_omitted() {
    let json = r#"{
        "title": "A",
        "user_story": "As a user",
        "acceptance_criteria": []
    }"#;
    let story: Story = serde_json::from_str(json).unwrap();
    let out = serde_json::to_value(&story).unwrap();

    assert!(out.get("id").is_none());
    assert!(out.get("labels").is_none());
    assert!(out.get("merged_from_chunks").is_none());
}
