//! Clear command for mnemo
//!
//! Deletes all stored state for a session: transcript, summary, metadata
//! and the turn counter.

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;

/// Delete all stored state for a session
///
/// Refuses to act unless `yes` is set, since the deletion cannot be
/// undone. Clearing a session that does not exist succeeds quietly.
pub fn run_clear(config: &Config, session: &str, yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{}",
            format!(
                "This will delete all stored state for session {}. Re-run with --yes to confirm.",
                session
            )
            .yellow()
        );
        return Ok(());
    }

    tracing::info!("Clearing session: {}", session);

    let memory = super::open_memory_read_only(config)?;
    let stats = memory.get_stats(session)?;
    memory.clear(session)?;

    println!(
        "{}",
        format!("Cleared session {} ({} turns)", session, stats.turn_count).green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_temp_db(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("memory.db"));
        config
    }

    #[tokio::test]
    async fn test_run_clear_removes_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_temp_db(&dir);

        let memory = crate::commands::open_memory(&config).unwrap();
        memory.save_context("s1", "hello", "hi").await.unwrap();
        assert_eq!(memory.get_stats("s1").unwrap().turn_count, 1);
        drop(memory);

        run_clear(&config, "s1", true).unwrap();

        let memory = crate::commands::open_memory_read_only(&config).unwrap();
        assert_eq!(memory.get_stats("s1").unwrap().turn_count, 0);
    }

    #[tokio::test]
    async fn test_run_clear_without_yes_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_temp_db(&dir);

        let memory = crate::commands::open_memory(&config).unwrap();
        memory.save_context("s1", "hello", "hi").await.unwrap();
        drop(memory);

        run_clear(&config, "s1", false).unwrap();

        let memory = crate::commands::open_memory_read_only(&config).unwrap();
        assert_eq!(memory.get_stats("s1").unwrap().turn_count, 1);
    }

    #[test]
    fn test_run_clear_missing_session_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_temp_db(&dir);

        assert!(run_clear(&config, "missing", true).is_ok());
    }
}
