//! Configuration management for mnemo
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! The configuration is an explicit value passed into constructors;
//! there is no process-global settings object.

use crate::error::{MnemoError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for mnemo
///
/// Holds everything the memory engine needs: where the database lives,
/// how the buffer/summary split behaves, and which summarizer backend
/// to use.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Memory manager configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Summarizer backend configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Path to the SQLite database file. When unset, a platform data
    /// directory is used.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the database path, falling back to the platform data directory
    ///
    /// # Errors
    ///
    /// Returns error if no home/data directory can be determined
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("com", "mnemo", "mnemo").ok_or_else(|| {
            MnemoError::Storage("Could not determine data directory for database".to_string())
        })?;
        Ok(dirs.data_dir().join("memory.db"))
    }
}

/// Memory manager configuration
///
/// Controls the buffer/summary split: how many approximate tokens the
/// recent window may hold, after how many turns a session enters summary
/// mode, and how large the rolling summary may grow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Approximate token budget of the recent-turn window
    #[serde(default = "default_buffer_window")]
    pub buffer_window: usize,

    /// Number of saved turns before a session switches to summary mode
    #[serde(default = "default_summary_threshold")]
    pub summary_threshold: u64,

    /// Token budget requested from the summarizer for the rolling summary
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: usize,
}

fn default_buffer_window() -> usize {
    2000
}

fn default_summary_threshold() -> u64 {
    15
}

fn default_summary_max_tokens() -> usize {
    1000
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            buffer_window: default_buffer_window(),
            summary_threshold: default_summary_threshold(),
            summary_max_tokens: default_summary_max_tokens(),
        }
    }
}

/// Summarizer backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Backend to use ("heuristic" or "groq")
    #[serde(default = "default_summarizer_backend")]
    pub backend: String,

    /// Model name for the hosted backend
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible chat-completions API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Sampling temperature for summarization calls
    #[serde(default = "default_summarizer_temperature")]
    pub temperature: f32,

    /// Upper bound on a single summarization call (seconds)
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u64,

    /// API key for the hosted backend. Never read from the config file;
    /// populated from the GROQ_API_KEY environment variable.
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_summarizer_backend() -> String {
    "heuristic".to_string()
}

fn default_summarizer_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_summarizer_temperature() -> f32 {
    0.1
}

fn default_summarizer_timeout() -> u64 {
    30
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: default_summarizer_backend(),
            model: default_summarizer_model(),
            api_base: default_api_base(),
            temperature: default_summarizer_temperature(),
            timeout_secs: default_summarizer_timeout(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MnemoError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MnemoError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(db_path) = std::env::var("MNEMO_DB") {
            if !db_path.is_empty() {
                self.storage.path = Some(PathBuf::from(db_path));
            }
        }

        if let Ok(backend) = std::env::var("MNEMO_SUMMARIZER") {
            if !backend.is_empty() {
                self.summarizer.backend = backend;
            }
        }

        if let Ok(threshold) = std::env::var("MNEMO_SUMMARY_THRESHOLD") {
            if let Ok(value) = threshold.parse() {
                self.memory.summary_threshold = value;
            } else {
                tracing::warn!("Invalid MNEMO_SUMMARY_THRESHOLD: {}", threshold);
            }
        }

        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.is_empty() {
                self.summarizer.api_key = Some(key);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db) = &cli.db {
            self.storage.path = Some(db.clone());
        }

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_backends = ["heuristic", "groq"];
        if !valid_backends.contains(&self.summarizer.backend.as_str()) {
            return Err(MnemoError::Config(format!(
                "Invalid summarizer backend: {}. Must be one of: {}",
                self.summarizer.backend,
                valid_backends.join(", ")
            ))
            .into());
        }

        if self.summarizer.model.is_empty() {
            return Err(
                MnemoError::Config("summarizer.model cannot be empty".to_string()).into(),
            );
        }

        if !(0.0..=2.0).contains(&self.summarizer.temperature) {
            return Err(MnemoError::Config(
                "summarizer.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.summarizer.timeout_secs == 0 {
            return Err(MnemoError::Config(
                "summarizer.timeout_secs must be greater than 0".to_string(),
            )
            .into());
        }

        if self.memory.buffer_window == 0 {
            return Err(MnemoError::Config(
                "memory.buffer_window must be greater than 0".to_string(),
            )
            .into());
        }

        if self.memory.summary_threshold == 0 {
            return Err(MnemoError::Config(
                "memory.summary_threshold must be greater than 0".to_string(),
            )
            .into());
        }

        if self.memory.summary_max_tokens == 0 {
            return Err(MnemoError::Config(
                "memory.summary_max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
