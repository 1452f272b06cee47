//! Save command for mnemo
//!
//! Records one completed turn (user message plus agent response) for a
//! session, optionally attaching a JSON tags object to the transcript
//! entry. When no session is given, a fresh one is started and its id
//! is printed so follow-up turns can reuse it.

use colored::Colorize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{MnemoError, Result};

/// Record one completed turn for a session
///
/// # Arguments
///
/// * `config` - Configuration containing storage and summarizer settings
/// * `session` - Session identifier; generated when `None`
/// * `message` - User message of the turn
/// * `response` - Agent response of the turn
/// * `tags` - Optional JSON text attached to the transcript entry
///
/// # Examples
///
/// ```no_run
/// use mnemo::config::Config;
/// use mnemo::commands::save::run_save;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load("config/config.yaml", &Default::default())?;
/// run_save(&config, Some("session-1"), "hello", "hi there", None).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_save(
    config: &Config,
    session: Option<&str>,
    message: &str,
    response: &str,
    tags: Option<&str>,
) -> Result<()> {
    let session = match session {
        Some(id) => id.to_string(),
        None => {
            let id = Uuid::new_v4().to_string();
            println!("Started session {}", id.cyan());
            id
        }
    };
    tracing::info!("Saving turn for session: {}", session);

    let tags = tags.map(parse_tags).transpose()?;
    let memory = super::open_memory(config)?;

    memory
        .save_context_with_tags(&session, message, response, tags.as_ref())
        .await?;

    let stats = memory.get_stats(&session)?;
    println!(
        "{}",
        format!(
            "Saved turn {} for session {} ({})",
            stats.turn_count, session, stats.mode
        )
        .green()
    );

    Ok(())
}

/// Parse the --tags argument into a JSON value
///
/// # Errors
///
/// Returns `MnemoError::Config` if the text is not valid JSON
fn parse_tags(raw: &str) -> Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| MnemoError::Config(format!("--tags must be valid JSON: {}", e)).into())
}
