//! Sessions command for mnemo
//!
//! Lists every stored session with its turn count and timestamps.

use colored::Colorize;
use prettytable::{format, Table};

use crate::config::Config;
use crate::error::Result;
use crate::storage::SessionInfo;

/// List stored sessions, most recently updated first
pub fn run_sessions(config: &Config) -> Result<()> {
    tracing::info!("Listing sessions");

    let store = super::open_store(config)?;
    let sessions = store.list_sessions()?;

    output_sessions_table(&sessions);
    Ok(())
}

/// Output the session list as a table
fn output_sessions_table(sessions: &[SessionInfo]) {
    if sessions.is_empty() {
        println!("{}", "No stored sessions.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "Session".bold(),
        "Turns".bold(),
        "Created".bold(),
        "Last Updated".bold()
    ]);

    for session in sessions {
        let created = session.created_at.format("%Y-%m-%d %H:%M").to_string();
        let updated = session.updated_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            session.session_id.cyan(),
            session.turn_count,
            created,
            updated
        ]);
    }

    println!("\nStored sessions:");
    table.printstd();
    println!();
    println!(
        "Use {} to inspect a session.",
        "mnemo stats --session <ID>".cyan()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_output_sessions_table_empty_smoke() {
        output_sessions_table(&[]);
    }

    #[test]
    fn test_output_sessions_table_smoke() {
        let sessions = vec![SessionInfo {
            session_id: "s1".to_string(),
            turn_count: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];
        output_sessions_table(&sessions);
    }

    #[test]
    fn test_run_sessions_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("memory.db"));

        assert!(run_sessions(&config).is_ok());
    }
}
