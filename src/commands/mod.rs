/*!
Command handlers for the CLI

Each submodule implements one subcommand:

- `save`     — Record one completed turn for a session
- `history`  — Show recent transcript entries
- `stats`    — Show diagnostic counters for a session
- `sessions` — List stored sessions
- `clear`    — Delete all stored state for a session

Handlers build the memory engine from configuration and render results
as tables or JSON.
*/

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::memory::HybridMemory;
use crate::storage::SqliteStore;
use crate::summarizer::{create_summarizer, HeuristicSummarizer};

pub mod clear;
pub mod history;
pub mod save;
pub mod sessions;
pub mod stats;

/// Open the storage layer at the configured database path
pub fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let db_path = config.storage.resolve_path()?;
    Ok(Arc::new(SqliteStore::new(db_path)?))
}

/// Build the full memory engine, including the configured summarizer backend
pub fn open_memory(config: &Config) -> Result<HybridMemory> {
    let store = open_store(config)?;
    let summarizer = create_summarizer(config)?;
    Ok(HybridMemory::new(store, summarizer, config))
}

/// Build the memory engine for read-only commands
///
/// Read paths never invoke the summarizer, so the configured backend is
/// not constructed and its credentials are not required.
pub fn open_memory_read_only(config: &Config) -> Result<HybridMemory> {
    let store = open_store(config)?;
    let summarizer = Box::new(HeuristicSummarizer::new(config.memory.summary_max_tokens));
    Ok(HybridMemory::new(store, summarizer, config))
}
