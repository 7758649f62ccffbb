//! Integration tests for the question bank on a JSON file
//!
//! These tests use a temporary directory and validate recovery of
//! malformed stores and the enabled-subset contract end to end.
//!
//! Run with: cargo test --package quizbuzz-storage --test integration_bank

use quizbuzz_storage::{JsonFileStore, QuestionBank, QuestionRecord, StoreConfig};
use rstest::rstest;
use tempfile::TempDir;

fn bank_in(dir: &TempDir) -> QuestionBank<JsonFileStore> {
    QuestionBank::new(JsonFileStore::new(StoreConfig::new(
        dir.path().join("questions.json"),
    )))
}

/// Contents of an unusable question file; `None` means no file at all.
#[rstest]
#[case::missing(None)]
#[case::not_json(Some("not json at all"))]
#[case::not_a_list(Some(r#"{"question": "Q1"}"#))]
#[case::too_short(Some(r#"[{"question": "Q1", "enabled": true}]"#))]
#[tokio::test]
async fn test_unusable_file_is_replaced_by_default_bank(#[case] contents: Option<&str>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questions.json");
    if let Some(contents) = contents {
        std::fs::write(&path, contents).unwrap();
    }
    let bank = bank_in(&dir);

    assert!(bank.load_enabled().await.is_empty());

    let text = std::fs::read_to_string(&path).unwrap();
    let stored: Vec<QuestionRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(stored.len(), 13);
    assert_eq!(stored[12].question, "Question 13");
}

#[tokio::test]
async fn test_configured_minimum_keeps_edits() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path().join("questions.json")).min_length(15);
    let bank = QuestionBank::new(JsonFileStore::new(config.clone()));

    bank.edit(14, |record| {
        *record = QuestionRecord::new("Last slot?", ["yes", "no", "", ""], 0);
    })
    .await
    .unwrap();

    let reopened = QuestionBank::new(JsonFileStore::new(config));
    assert_eq!(reopened.load_records().await.len(), 15);
    let enabled = reopened.load_enabled().await;
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].text, "Last slot?");
}

#[tokio::test]
async fn test_hand_written_file_with_missing_fields() {
    let dir = TempDir::new().unwrap();
    let mut entries: Vec<String> = (0..13)
        .map(|i| format!(r#"{{"question": "Q{i}"}}"#))
        .collect();
    entries[4] = r#"{"question": "Boiling point of water?", "answers": ["90", "", "100"], "correct": 2, "enabled": true}"#.to_string();
    std::fs::write(
        dir.path().join("questions.json"),
        format!("[{}]", entries.join(",")),
    )
    .unwrap();

    let enabled = bank_in(&dir).load_enabled().await;
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].text, "Boiling point of water?");
    assert_eq!(enabled[0].options, vec!["90", "100"]);
    assert_eq!(enabled[0].correct, Some(1));
}

#[tokio::test]
async fn test_edit_then_reload() {
    let dir = TempDir::new().unwrap();
    let bank = bank_in(&dir);
    bank.load_records().await;

    bank.edit(3, |record| {
        *record = QuestionRecord::new("Speed of light?", ["300k km/s", "30 km/s", "", ""], 0);
    })
    .await
    .unwrap();

    let reopened = bank_in(&dir);
    let enabled = reopened.load_enabled().await;
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].text, "Speed of light?");
}
