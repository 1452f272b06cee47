//! Offline extractive summarizer
//!
//! Keeps a rolling digest as one line per utterance and compresses by
//! dropping the oldest lines once the token budget is exceeded. Fully
//! deterministic and network-free, which makes it the default backend and
//! the one used in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::memory::{estimate_tokens, Turn};
use crate::summarizer::Summarizer;

const MAX_LINE_CHARS: usize = 160;

/// Deterministic summarizer with no external dependencies
pub struct HeuristicSummarizer {
    max_tokens: usize,
}

impl HeuristicSummarizer {
    /// Create a heuristic summarizer bounded by `max_tokens`
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }
}

#[async_trait]
impl Summarizer for HeuristicSummarizer {
    async fn summarize(&self, previous_summary: &str, new_turns: &[Turn]) -> Result<String> {
        let mut lines: Vec<String> = previous_summary
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect();

        for turn in new_turns {
            if !turn.message.trim().is_empty() {
                lines.push(format!("User: {}", condense(&turn.message)));
            }
            if !turn.response.trim().is_empty() {
                lines.push(format!("Agent: {}", condense(&turn.response)));
            }
        }

        // Compress oldest-first until the budget holds
        while lines.len() > 1 && total_tokens(&lines) > self.max_tokens {
            lines.remove(0);
        }

        if let [only] = lines.as_mut_slice() {
            if estimate_tokens(only) > self.max_tokens {
                *only = truncate(only, self.max_tokens.saturating_mul(4));
            }
        }

        Ok(lines.join("\n"))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

fn total_tokens(lines: &[String]) -> usize {
    lines.iter().map(|line| estimate_tokens(line)).sum()
}

/// Collapses whitespace runs and caps the line length
fn condense(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, MAX_LINE_CHARS)
}

/// Truncates a string to a maximum length, adding ellipsis if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut truncated = s.chars().take(max_len.saturating_sub(3)).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}
