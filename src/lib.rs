//! mnemo - Hybrid conversation memory library
//!
//! This library provides durable per-session conversation memory for
//! agent applications: a token-budgeted buffer of recent turns, a rolling
//! summary of older turns, an append-only transcript, and a structured
//! metadata document.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `memory`: Hybrid memory manager, recent buffer, metadata and session state
//! - `storage`: SQLite persistence for sessions, transcript, summary and metadata
//! - `summarizer`: Summarization backends (heuristic, Groq) behind one trait
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mnemo::config::Config;
//! use mnemo::memory::HybridMemory;
//! use mnemo::storage::SqliteStore;
//! use mnemo::summarizer::create_summarizer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = Arc::new(SqliteStore::new(config.storage.resolve_path()?)?);
//!     let summarizer = create_summarizer(&config)?;
//!     let memory = HybridMemory::new(store, summarizer, &config);
//!
//!     memory.save_context("session-1", "hello", "hi there").await?;
//!     let variables = memory.load_memory_variables("session-1")?;
//!     println!("{} recent turns", variables.recent_turns.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod memory;
pub mod storage;
pub mod summarizer;

// Re-export commonly used types
pub use config::Config;
pub use error::{MnemoError, Result};
pub use memory::{HybridMemory, MemoryMode, MemoryVariables, SessionState, Turn};
pub use storage::SqliteStore;
pub use summarizer::{create_summarizer, Summarizer};
