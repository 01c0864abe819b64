//! End-to-end session persistence: analyze, mutate, save, reload, and
//! compare field for field.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use textfreq_core::{AnalysisError, Capabilities, LoadMode, SearchOutcome, TextAnalysis};

const SAMPLE: &str = "The player plays on the playground.\n\
                      Another player watches the game.\n\
                      \n\
                      Numbers: 42 and 3.14 everywhere.\n";

fn sample_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sample.txt");
    fs::write(&path, SAMPLE).unwrap();
    path
}

fn saved_session(dir: &TempDir, engine: &TextAnalysis, extension: &str) -> PathBuf {
    let date = engine.created().date();
    dir.path().join(format!("{date}_sample_000.{extension}"))
}

/// Drive the engine through a representative session: searches that warm
/// the cache, a replace, and an undo that leaves a redo pending.
fn exercised_engine(dir: &TempDir) -> TextAnalysis {
    let path = sample_file(dir);
    let mut engine = TextAnalysis::load(&path, Capabilities::default()).unwrap();
    assert!(matches!(
        engine.search("player", true),
        SearchOutcome::Found(_)
    ));
    assert!(matches!(engine.search("game", false), SearchOutcome::Found(_)));
    engine.search("game", false);
    engine.remove_or_replace("match");
    engine.search("player", false);
    engine.remove_or_replace("actor");
    engine.undo();
    engine
}

#[test]
fn json_round_trip_reproduces_every_field() {
    let dir = TempDir::new().unwrap();
    let engine = exercised_engine(&dir);
    engine.save_to_json().unwrap();

    let restored = TextAnalysis::load(&saved_session(&dir, &engine, "json"), Capabilities::default())
        .unwrap();
    assert_eq!(restored.to_record(), engine.to_record());
    assert_eq!(restored.text(), engine.text());
    assert_eq!(restored.old_text(), engine.old_text());
    assert_eq!(restored.language(), engine.language());
    assert_eq!(restored.created(), engine.created());
    assert_eq!(restored.cache().keys(), engine.cache().keys());
    assert_eq!(restored.history().undo_stack(), engine.history().undo_stack());
    assert_eq!(restored.history().redo_stack(), engine.history().redo_stack());
}

#[test]
fn binary_round_trip_reproduces_every_field() {
    let dir = TempDir::new().unwrap();
    let engine = exercised_engine(&dir);
    engine.save_to_binary().unwrap();

    let restored = TextAnalysis::load(&saved_session(&dir, &engine, "bin"), Capabilities::default())
        .unwrap();
    assert_eq!(restored.to_record(), engine.to_record());
}

#[test]
fn both_encodings_carry_the_same_record() {
    let dir = TempDir::new().unwrap();
    let engine = exercised_engine(&dir);
    engine.save_to_json().unwrap();
    engine.save_to_binary().unwrap();

    let from_json =
        TextAnalysis::load(&saved_session(&dir, &engine, "json"), Capabilities::default()).unwrap();
    let from_binary =
        TextAnalysis::load(&saved_session(&dir, &engine, "bin"), Capabilities::default()).unwrap();
    assert_eq!(from_json.to_record(), from_binary.to_record());
}

#[test]
fn cold_cache_load_drops_cache_but_keeps_history() {
    let dir = TempDir::new().unwrap();
    let engine = exercised_engine(&dir);
    engine.save_to_json().unwrap();

    let restored = TextAnalysis::load_with(
        &saved_session(&dir, &engine, "json"),
        Capabilities::default(),
        LoadMode::ColdCache,
    )
    .unwrap();
    assert!(restored.cache().is_empty());
    assert!(restored.cache().keys().is_empty());
    assert_eq!(restored.text(), engine.text());
    assert_eq!(restored.history().undo_stack(), engine.history().undo_stack());
    assert_eq!(restored.history().redo_stack(), engine.history().redo_stack());
}

#[test]
fn restored_session_keeps_working() {
    let dir = TempDir::new().unwrap();
    let engine = exercised_engine(&dir);
    engine.save_to_json().unwrap();

    let mut restored = TextAnalysis::load(&saved_session(&dir, &engine, "json"), Capabilities::default())
        .unwrap();
    // The pending redo survived the round trip.
    assert_eq!(restored.redo(), "Successful redo.");
    assert!(restored.text().contains("actor"));

    // And searching still works against the restored document.
    assert!(matches!(
        restored.search("actor", false),
        SearchOutcome::Found(_)
    ));
}

#[test]
fn json_field_names_match_the_session_format() {
    let dir = TempDir::new().unwrap();
    let engine = exercised_engine(&dir);
    engine.save_to_json().unwrap();

    let raw = fs::read_to_string(saved_session(&dir, &engine, "json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for field in [
        "old_text",
        "text",
        "result_counter",
        "datetime_created",
        "language",
        "search_cache",
        "search_cache_keys",
        "history",
        "redo_stack",
    ] {
        assert!(value.get(field).is_some(), "missing field {field}");
    }
}

#[test]
fn truncated_binary_session_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let engine = exercised_engine(&dir);
    engine.save_to_binary().unwrap();

    let path = saved_session(&dir, &engine, "bin");
    let raw = fs::read(&path).unwrap();
    fs::write(&path, &raw[..raw.len() / 2]).unwrap();

    let err = TextAnalysis::load(&path, Capabilities::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::CorruptSession(_)));
}
