//! Stats command for mnemo
//!
//! Shows diagnostic counters and the metadata document for a session.

use crate::config::Config;
use crate::error::{MnemoError, Result};
use crate::memory::SessionStats;

/// Show diagnostic counters and metadata for a session
///
/// # Arguments
///
/// * `config` - Configuration containing storage settings
/// * `session` - Session identifier
/// * `json` - Print JSON instead of the detailed view
pub fn run_stats(config: &Config, session: &str, json: bool) -> Result<()> {
    tracing::info!("Showing stats for session: {}", session);

    let memory = super::open_memory_read_only(config)?;
    let stats = memory.get_stats(session)?;

    if json {
        output_stats_json(&stats)?;
    } else {
        output_stats_detailed(&stats);
    }

    Ok(())
}

/// Output session stats as pretty JSON
///
/// # Errors
///
/// Returns `MnemoError::Serialization` if serialization fails
fn output_stats_json(stats: &SessionStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(MnemoError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Output session stats in detailed format
fn output_stats_detailed(stats: &SessionStats) {
    println!("\nSession Stats ({})\n", stats.session_id);
    println!("Turn Count:        {}", stats.turn_count);
    println!("Mode:              {}", stats.mode);
    println!("Buffer Window:     {} tokens", stats.buffer_window);
    println!("Summary Threshold: {} turns", stats.summary_threshold);

    if stats.metadata.is_empty() {
        println!("Metadata:          (empty)");
    } else {
        println!("\nMetadata:");
        for (key, value) in &stats.metadata {
            println!("  {}: {}", key, value);
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryMode;
    use serde_json::{json, Map};

    fn sample_stats() -> SessionStats {
        let mut metadata = Map::new();
        metadata.insert("welcome_done".to_string(), json!(true));

        SessionStats {
            session_id: "s1".to_string(),
            turn_count: 7,
            mode: MemoryMode::BufferOnly,
            buffer_window: 2000,
            summary_threshold: 15,
            metadata,
        }
    }

    #[test]
    fn test_output_stats_json_includes_mode_label() {
        let stats = sample_stats();
        let json = serde_json::to_string_pretty(&stats).unwrap();
        assert!(json.contains("\"buffer_only\""));
        assert!(json.contains("\"turn_count\": 7"));
    }

    #[test]
    fn test_output_stats_json_returns_ok() {
        assert!(output_stats_json(&sample_stats()).is_ok());
    }

    #[test]
    fn test_output_stats_detailed_smoke() {
        output_stats_detailed(&sample_stats());
    }

    #[test]
    fn test_run_stats_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("memory.db"));

        assert!(run_stats(&config, "fresh", false).is_ok());
        assert!(run_stats(&config, "fresh", true).is_ok());
    }
}
