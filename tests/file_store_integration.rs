//! Integration tests for file-backed chat history persistence.
//!
//! Each test works inside its own temporary directory and exercises the
//! public store API end to end.

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, eyre};
use parley::history::{
    adapters::file::FileHistoryStore,
    config::SerializationConfig,
    domain::{ChatHistory, ChatMessage, Metadata},
    error::{DeserializationError, StoreError},
    ports::store::HistoryStore,
};
use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;

#[fixture]
fn workspace() -> Result<TempDir> {
    Ok(tempfile::tempdir()?)
}

fn history_path(dir: &TempDir, name: &str) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(dir.path().join(name))
        .map_err(|path| eyre!("temporary path is not UTF-8: {}", path.display()))
}

fn sample_history() -> ChatHistory {
    let mut metadata = Metadata::new();
    metadata.insert("call_id".to_owned(), json!("c-1"));
    metadata.insert("elapsed_ms".to_owned(), json!(12));

    let mut history = ChatHistory::with_system_message("You are a careful assistant.");
    history.add_user_message("List the files.");
    history.add_tool_message("a.rs\nb.rs", Some(metadata));
    history.add_assistant_message("There are two files.");
    history
}

#[rstest]
fn save_and_load_round_trip(workspace: Result<TempDir>) -> Result<()> {
    let dir = workspace?;
    let store = FileHistoryStore::open(history_path(&dir, "history.json")?)?;
    let history = sample_history();

    store.save(&history)?;
    let loaded = store.load()?;

    assert_eq!(loaded, history);
    Ok(())
}

#[rstest]
fn file_holds_exactly_the_serialised_json(workspace: Result<TempDir>) -> Result<()> {
    let dir = workspace?;
    let path = history_path(&dir, "history.json")?;
    let history = sample_history();

    history.store_to_file(&path)?;

    let on_disk = std::fs::read_to_string(&path)?;
    assert_eq!(on_disk, history.serialize()?);
    assert_eq!(ChatHistory::load_from_file(&path)?, history);
    Ok(())
}

#[rstest]
fn save_overwrites_previous_history(workspace: Result<TempDir>) -> Result<()> {
    let dir = workspace?;
    let store = FileHistoryStore::open(history_path(&dir, "history.json")?)?
        .with_config(SerializationConfig::compact());

    store.save(&sample_history())?;
    let replacement = ChatHistory::from_messages(vec![ChatMessage::user("Start over")]);
    store.save(&replacement)?;

    assert_eq!(store.load()?, replacement);
    let on_disk = std::fs::read_to_string(store.path())?;
    assert_eq!(
        on_disk,
        r#"{"messages":[{"role":"user","content":"Start over"}]}"#
    );
    Ok(())
}

#[rstest]
fn loading_a_missing_file_reports_not_found(workspace: Result<TempDir>) -> Result<()> {
    let dir = workspace?;
    let store = FileHistoryStore::open(history_path(&dir, "absent.json")?)?;

    match store.load() {
        Err(StoreError::Io(err)) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
        other => return Err(eyre!("expected not-found error, got {other:?}")),
    }
    Ok(())
}

#[rstest]
fn loading_corrupt_json_reports_deserialization(workspace: Result<TempDir>) -> Result<()> {
    let dir = workspace?;
    let path = history_path(&dir, "corrupt.json")?;
    std::fs::write(&path, r#"{"messages": [{"role": "user"}]}"#)?;

    let result = ChatHistory::load_from_file(&path);

    assert!(matches!(
        result,
        Err(StoreError::Deserialization(DeserializationError::Schema(_)))
    ));
    Ok(())
}

#[rstest]
fn opening_inside_a_missing_directory_fails(workspace: Result<TempDir>) -> Result<()> {
    let dir = workspace?;
    let path = history_path(&dir, "missing/history.json")?;

    assert!(FileHistoryStore::open(&path).is_err());
    assert!(matches!(
        sample_history().store_to_file(&path),
        Err(StoreError::Io(_))
    ));
    Ok(())
}

#[test]
fn opening_a_path_without_file_name_fails() {
    assert!(FileHistoryStore::open(Utf8Path::new("/")).is_err());
}
