use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("ragline.toml");
    let content = format!(
        "[storage]\nindex_path = {:?}\nuploads_dir = {:?}\n\n[embedder]\nendpoint = \"http://127.0.0.1:1\"\n{}",
        dir.join("index.json").display().to_string(),
        dir.join("uploads").display().to_string(),
        extra
    );
    fs::write(&path, content).unwrap();
    path
}

fn ragline() -> Command {
    Command::cargo_bin("ragline").unwrap()
}

#[test]
fn test_help_lists_commands() {
    ragline()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_status_without_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    ragline()
        .arg("status")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No index found"));
}

#[test]
fn test_search_on_empty_index_needs_no_service() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    ragline()
        .args(["search", "anything", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found"));

    ragline()
        .args(["search", "anything", "--json", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_ingest_fails_fast_when_service_is_down() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let doc = dir.path().join("notes.txt");
    fs::write(&doc, "some text worth indexing").unwrap();

    ragline()
        .arg("ingest")
        .arg(&doc)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unavailable"));

    assert!(!dir.path().join("index.json").exists());
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "\n[chunking]\nchunk_size = 100\noverlap = 100\n");

    ragline()
        .arg("status")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlap"));
}
