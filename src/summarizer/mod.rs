//! Summarization backends
//!
//! A summarizer folds newly saved turns into the previous summary text.
//! The memory manager treats it as a black-box text transform: failures
//! and timeouts degrade to "keep the previous summary", they never fail
//! the turn being saved.

pub mod groq;
pub mod heuristic;

pub use groq::GroqSummarizer;
pub use heuristic::HeuristicSummarizer;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{MnemoError, Result};
use crate::memory::Turn;

/// Incremental condenser over conversation turns
///
/// `summarize` is seeded with the previous summary and never re-reads the
/// full transcript, so cost stays proportional to the new turns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Fold `new_turns` into `previous_summary` and return the replacement
    async fn summarize(&self, previous_summary: &str, new_turns: &[Turn]) -> Result<String>;

    /// Backend name for logs and stats
    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer").field("name", &self.name()).finish()
    }
}

/// Create a summarizer instance based on configuration
///
/// # Errors
///
/// Returns an error if the backend name is unknown or initialization fails
/// (for example a missing API key for the `groq` backend).
pub fn create_summarizer(config: &Config) -> Result<Box<dyn Summarizer>> {
    match config.summarizer.backend.as_str() {
        "heuristic" => Ok(Box::new(HeuristicSummarizer::new(
            config.memory.summary_max_tokens,
        ))),
        "groq" => Ok(Box::new(GroqSummarizer::new(
            &config.summarizer,
            config.memory.summary_max_tokens,
        )?)),
        other => Err(MnemoError::Config(format!(
            "unknown summarizer backend: {}",
            other
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_heuristic_summarizer() {
        let config = Config::default();
        let summarizer = create_summarizer(&config).unwrap();
        assert_eq!(summarizer.name(), "heuristic");
    }

    #[test]
    fn test_create_groq_summarizer_requires_api_key() {
        let mut config = Config::default();
        config.summarizer.backend = "groq".to_string();
        config.summarizer.api_key = None;

        assert!(create_summarizer(&config).is_err());
    }

    #[test]
    fn test_create_groq_summarizer_with_api_key() {
        let mut config = Config::default();
        config.summarizer.backend = "groq".to_string();
        config.summarizer.api_key = Some("test-key".to_string());

        let summarizer = create_summarizer(&config).unwrap();
        assert_eq!(summarizer.name(), "groq");
    }

    #[test]
    fn test_create_unknown_backend_fails() {
        let mut config = Config::default();
        config.summarizer.backend = "telepathy".to_string();

        let err = create_summarizer(&config).unwrap_err();
        assert!(err.to_string().contains("telepathy"));
    }
}
