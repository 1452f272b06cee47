//! Hybrid conversation memory
//!
//! This module contains the per-session memory layer: the metadata document
//! store, the token-budgeted recent buffer, and the hybrid manager that
//! switches between buffer-only and buffer-plus-summary operation as a
//! session grows.

pub mod buffer;
pub mod hybrid;
pub mod metadata;
pub mod metrics;
pub mod session_state;

pub use buffer::RecentBuffer;
pub use hybrid::{HistorySnapshot, HybridMemory, MemoryMode, MemoryVariables, SessionStats};
pub use metadata::MetadataStore;
pub use session_state::SessionState;

use serde::{Deserialize, Serialize};

/// One user/agent exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// What the user said
    pub message: String,
    /// What the agent answered
    pub response: String,
}

impl Turn {
    /// Create a turn from a message/response pair
    ///
    /// # Examples
    ///
    /// ```
    /// use mnemo::memory::Turn;
    ///
    /// let turn = Turn::new("hello", "hi there");
    /// assert_eq!(turn.message, "hello");
    /// ```
    pub fn new(message: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: response.into(),
        }
    }

    /// Approximate prompt cost of the pair
    pub fn token_cost(&self) -> usize {
        estimate_tokens(&self.message) + estimate_tokens(&self.response)
    }
}

/// Estimates token count for a string using a simple heuristic
///
/// Uses characters / 4, which approximates GPT tokenization for English text.
/// The budget it feeds is a soft cap for prompt-size control, not an
/// exactness contract.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}
