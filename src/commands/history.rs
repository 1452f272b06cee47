//! History command for mnemo
//!
//! Shows the most recent transcript entries for a session, oldest first,
//! optionally with the session's rolling summary.

use colored::Colorize;
use prettytable::{format, Table};

use crate::config::Config;
use crate::error::{MnemoError, Result};
use crate::memory::HistorySnapshot;

/// Show the most recent transcript entries for a session
///
/// # Arguments
///
/// * `config` - Configuration containing storage settings
/// * `session` - Session identifier
/// * `limit` - Maximum number of entries to show
/// * `include_summary` - Include the rolling summary when the session has one
/// * `json` - Print JSON instead of a table
pub fn run_history(
    config: &Config,
    session: &str,
    limit: usize,
    include_summary: bool,
    json: bool,
) -> Result<()> {
    tracing::info!("Showing history for session: {}", session);

    let memory = super::open_memory_read_only(config)?;
    let snapshot = memory.get_conversation_history(session, limit, include_summary)?;

    if json {
        output_history_json(&snapshot)?;
    } else {
        output_history_table(&snapshot, session);
    }

    Ok(())
}

/// Output a history snapshot as pretty JSON
///
/// # Errors
///
/// Returns `MnemoError::Serialization` if serialization fails
fn output_history_json(snapshot: &HistorySnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(MnemoError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Output a history snapshot as a table
fn output_history_table(snapshot: &HistorySnapshot, session: &str) {
    if snapshot.recent_messages.is_empty() {
        println!("{}", format!("No history for session {}.", session).yellow());
        return;
    }

    if !snapshot.summary.is_empty() {
        println!("\nSummary of older turns:");
        for line in snapshot.summary.lines() {
            println!("  {}", line);
        }
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "Time".bold(),
        "Message".bold(),
        "Response".bold()
    ]);

    for entry in &snapshot.recent_messages {
        table.add_row(prettytable::row![
            entry.created_at.cyan(),
            clip(&entry.message, 48),
            clip(&entry.response, 48)
        ]);
    }

    println!("\nHistory for session {} ({} entries):", session, snapshot.total);
    table.printstd();
    println!();
}

/// Truncate text to at most `max` characters for table display
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
