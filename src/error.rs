//! Error types for mnemo
//!
//! This module defines all error types used throughout the engine,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for mnemo operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, storage access, and summarizer interactions.
#[derive(Error, Debug)]
pub enum MnemoError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Summarizer-related errors (API calls, malformed replies, timeouts)
    #[error("Summarizer error: {0}")]
    Summarizer(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for mnemo operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
