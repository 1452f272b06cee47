//! CLI integration tests.
//!
//! These run the compiled `mnemo` binary against a temp database via the
//! `--db` override. Environment variables that would redirect storage or
//! change the summarizer backend are stripped so the tests are hermetic.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

mod common;

/// Binary invocation with config-related environment stripped
fn mnemo_cmd() -> Command {
    let mut cmd = Command::cargo_bin("mnemo").expect("binary exists");
    cmd.env_remove("MNEMO_DB")
        .env_remove("MNEMO_SUMMARIZER")
        .env_remove("MNEMO_SUMMARY_THRESHOLD")
        .env_remove("GROQ_API_KEY");
    cmd
}

fn save_turn(db: &Path, session: &str, message: &str, response: &str) {
    mnemo_cmd()
        .arg("--db")
        .arg(db)
        .args(["save", "--session", session, "--message", message, "--response", response])
        .assert()
        .success();
}

#[test]
fn test_version_flag() {
    mnemo_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mnemo"));
}

#[test]
fn test_missing_subcommand_fails() {
    mnemo_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_save_reports_turn_and_mode() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["save", "-s", "s1", "-m", "hello there", "-r", "hi yourself"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved turn 1 for session s1"))
        .stdout(predicate::str::contains("buffer_only"));
}

#[test]
fn test_save_without_session_generates_one() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["save", "-m", "hello", "-r", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started session"))
        .stdout(predicate::str::contains("Saved turn 1"));
}

#[test]
fn test_save_then_history_json() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    save_turn(&db, "s1", "what is compounding", "interest on interest");
    save_turn(&db, "s1", "since when", "a very long time");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["history", "--session", "s1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("what is compounding"))
        .stdout(predicate::str::contains("\"total\": 2"));
}

#[test]
fn test_history_empty_session() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["history", "--session", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No history for session nobody"));
}

#[test]
fn test_save_rejects_invalid_tags() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["save", "-s", "s1", "-m", "x", "-r", "y", "--tags", "{broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--tags must be valid JSON"));
}

#[test]
fn test_sessions_lists_saved_sessions() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    save_turn(&db, "alpha", "hi", "hello");
    save_turn(&db, "beta", "hola", "buenas");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .arg("sessions")
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("beta"));
}

#[test]
fn test_stats_json_reports_mode() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    save_turn(&db, "s1", "hi", "hello");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["stats", "--session", "s1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"turn_count\": 1"))
        .stdout(predicate::str::contains("\"buffer_only\""));
}

#[test]
fn test_clear_requires_confirmation() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    save_turn(&db, "s1", "hi", "hello");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["clear", "--session", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Re-run with --yes"));

    // Still there.
    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["stats", "--session", "s1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"turn_count\": 1"));
}

#[test]
fn test_clear_with_yes_deletes_session() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");

    save_turn(&db, "s1", "hi", "hello");

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["clear", "--session", "s1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared session s1"));

    mnemo_cmd()
        .arg("--db")
        .arg(&db)
        .args(["stats", "--session", "s1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"turn_count\": 0"));
}

#[test]
fn test_config_file_controls_threshold() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("memory.db");
    let (_config_dir, config_path) = common::temp_config_file(
        "memory:\n  summary_threshold: 1\nsummarizer:\n  backend: heuristic\n",
    );

    for _ in 0..2 {
        mnemo_cmd()
            .arg("--config")
            .arg(&config_path)
            .arg("--db")
            .arg(&db)
            .args(["save", "-s", "s1", "-m", "short question", "-r", "short answer"])
            .assert()
            .success();
    }

    mnemo_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("--db")
        .arg(&db)
        .args(["stats", "--session", "s1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"buffer_plus_summary\""));
}

#[test]
fn test_invalid_backend_in_config_rejected() {
    let (_config_dir, config_path) =
        common::temp_config_file("summarizer:\n  backend: nonsense\n");

    mnemo_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("sessions")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid summarizer backend"));
}
