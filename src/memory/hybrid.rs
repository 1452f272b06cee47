//! Hybrid memory manager
//!
//! Decides per session whether recent context alone is enough or whether a
//! rolling summary of older turns is needed, and keeps both views current
//! while persisting every turn to the transcript.
//!
//! A session starts in buffer-only operation. Once its persisted turn
//! counter reaches the configured threshold it permanently switches to
//! buffer-plus-summary: from then on every saved turn is also folded into
//! the running summary. The transition never reverses, even if the session
//! later shrinks.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{MnemoError, Result};
use crate::memory::metrics::{record_session_cleared, record_summary_outcome, SaveMetrics};
use crate::memory::{MetadataStore, RecentBuffer, SessionState, Turn};
use crate::storage::{SqliteStore, TranscriptEntry};
use crate::summarizer::Summarizer;

/// Operating mode of a session's memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryMode {
    /// Recent buffer only, no summarization
    BufferOnly,
    /// Recent buffer plus a rolling summary of older turns
    BufferPlusSummary,
}

impl MemoryMode {
    /// Stable textual form used in logs, stats and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryMode::BufferOnly => "buffer_only",
            MemoryMode::BufferPlusSummary => "buffer_plus_summary",
        }
    }
}

impl fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt-ready view of a session's memory
#[derive(Debug, Clone, Serialize)]
pub struct MemoryVariables {
    /// Most recent turns, oldest first
    pub recent_turns: Vec<Turn>,
    /// Rolling summary, empty while the session is in buffer-only mode
    pub summary: String,
    /// Full metadata document
    pub metadata: Map<String, Value>,
}

/// Transcript snapshot returned by history reads
#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    /// Transcript entries, oldest first
    pub recent_messages: Vec<TranscriptEntry>,
    /// Rolling summary when requested and available, empty otherwise
    pub summary: String,
    /// Number of entries returned
    pub total: usize,
}

/// Read-only diagnostic snapshot of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: String,
    pub turn_count: u64,
    pub mode: MemoryMode,
    pub buffer_window: usize,
    pub summary_threshold: u64,
    pub metadata: Map<String, Value>,
}

/// Per-session memory over durable storage and a summarization backend
///
/// Different sessions are fully independent. A single session is expected
/// to see one in-flight request at a time; the storage layer still keeps
/// the turn counter atomic under concurrent writers.
pub struct HybridMemory {
    store: Arc<SqliteStore>,
    metadata: MetadataStore,
    summarizer: Box<dyn Summarizer>,
    buffer_window: usize,
    summary_threshold: u64,
    summary_timeout: Duration,
    buffers: Mutex<HashMap<String, RecentBuffer>>,
}

impl HybridMemory {
    /// Create a manager over the given store and summarizer
    pub fn new(store: Arc<SqliteStore>, summarizer: Box<dyn Summarizer>, config: &Config) -> Self {
        Self {
            metadata: MetadataStore::new(store.clone()),
            store,
            summarizer,
            buffer_window: config.memory.buffer_window,
            summary_threshold: config.memory.summary_threshold,
            summary_timeout: Duration::from_secs(config.summarizer.timeout_secs),
            buffers: Mutex::new(HashMap::new()),
        }
    }

    /// Metadata store shared with this manager
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Domain view of one session's metadata
    pub fn session_state(&self, session_id: &str) -> SessionState {
        SessionState::new(self.metadata.clone(), session_id)
    }

    /// Current mode of a session, derived from the persisted turn counter
    pub fn mode(&self, session_id: &str) -> Result<MemoryMode> {
        Ok(self.mode_for(self.store.turn_count(session_id)?))
    }

    /// Record one completed turn
    ///
    /// The buffer always receives the turn. In summary mode the turn is
    /// additionally folded into the rolling summary, judged by the counter
    /// as it stood before this call. The transcript append and the counter
    /// increment land last and are the only steps that can fail the call:
    /// buffer or summarizer trouble is logged and absorbed so the durable
    /// record is never blocked by the derived views.
    pub async fn save_context(
        &self,
        session_id: &str,
        user_message: &str,
        agent_response: &str,
    ) -> Result<()> {
        self.save_context_with_tags(session_id, user_message, agent_response, None)
            .await
    }

    /// Record one completed turn with optional transcript tags
    pub async fn save_context_with_tags(
        &self,
        session_id: &str,
        user_message: &str,
        agent_response: &str,
        tags: Option<&Value>,
    ) -> Result<()> {
        let metrics = SaveMetrics::new();

        let turn_count = match self.store.turn_count(session_id) {
            Ok(count) => count,
            Err(e) => {
                metrics.record_error("storage");
                return Err(e);
            }
        };
        let mode = self.mode_for(turn_count);
        let turn = Turn::new(user_message, agent_response);

        if let Err(e) = self.with_buffer(session_id, |buffer| buffer.push(turn.clone())) {
            warn!("failed to update recent buffer for {}: {}", session_id, e);
        }

        if mode == MemoryMode::BufferPlusSummary {
            self.update_summary(session_id, &turn).await;
        }

        let new_count =
            match self
                .store
                .record_turn(session_id, user_message, agent_response, tags)
            {
                Ok(count) => count,
                Err(e) => {
                    metrics.record_error("storage");
                    return Err(e);
                }
            };

        debug!(
            "saved turn {} for session {} ({})",
            new_count, session_id, mode
        );
        metrics.record_saved(mode.as_str());
        Ok(())
    }

    /// Everything a prompt builder needs for the next turn
    ///
    /// The summary is reported empty while the session is below the
    /// threshold, even if older summary text is still persisted, so
    /// formatting code never has to branch on mode itself.
    pub fn load_memory_variables(&self, session_id: &str) -> Result<MemoryVariables> {
        let turn_count = self.store.turn_count(session_id)?;
        let mode = self.mode_for(turn_count);

        let recent_turns = self.with_buffer(session_id, |buffer| buffer.turns().to_vec())?;

        let summary = if mode == MemoryMode::BufferPlusSummary {
            self.store.summary(session_id)?
        } else {
            String::new()
        };

        let metadata = self.metadata.get_document(session_id)?;

        Ok(MemoryVariables {
            recent_turns,
            summary,
            metadata,
        })
    }

    /// Last `limit` transcript entries, oldest first
    ///
    /// The summary comes from persisted state, not from this instance's
    /// live buffer, so history reads stay correct across processes. It is
    /// included only when asked for and only once the session is in
    /// summary mode.
    pub fn get_conversation_history(
        &self,
        session_id: &str,
        limit: usize,
        include_summary: bool,
    ) -> Result<HistorySnapshot> {
        let mut recent_messages = self.store.recent_transcript(session_id, limit)?;
        recent_messages.reverse();

        let summary = if include_summary && self.mode(session_id)? == MemoryMode::BufferPlusSummary
        {
            self.store.summary(session_id)?
        } else {
            String::new()
        };

        let total = recent_messages.len();
        Ok(HistorySnapshot {
            recent_messages,
            summary,
            total,
        })
    }

    /// Irreversibly delete all persisted and in-memory state for a session
    pub fn clear(&self, session_id: &str) -> Result<()> {
        self.store.delete_session(session_id)?;
        self.lock_buffers()?.remove(session_id);
        record_session_cleared();
        debug!("cleared session {}", session_id);
        Ok(())
    }

    /// Diagnostic snapshot with no side effects
    pub fn get_stats(&self, session_id: &str) -> Result<SessionStats> {
        let turn_count = self.store.turn_count(session_id)?;
        Ok(SessionStats {
            session_id: session_id.to_string(),
            turn_count,
            mode: self.mode_for(turn_count),
            buffer_window: self.buffer_window,
            summary_threshold: self.summary_threshold,
            metadata: self.metadata.get_document(session_id)?,
        })
    }

    fn mode_for(&self, turn_count: u64) -> MemoryMode {
        if turn_count >= self.summary_threshold {
            MemoryMode::BufferPlusSummary
        } else {
            MemoryMode::BufferOnly
        }
    }

    /// Fold one turn into the rolling summary, absorbing all failures
    ///
    /// A summarizer error or timeout leaves the previous summary in place;
    /// the turn being saved is still durable in the transcript.
    async fn update_summary(&self, session_id: &str, turn: &Turn) {
        let started = Instant::now();

        let previous = match self.store.summary(session_id) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("failed to read summary for {}: {}", session_id, e);
                record_summary_outcome("error", started.elapsed());
                return;
            }
        };

        let fold = self
            .summarizer
            .summarize(&previous, std::slice::from_ref(turn));
        let updated = match tokio::time::timeout(self.summary_timeout, fold).await {
            Ok(Ok(updated)) => updated,
            Ok(Err(e)) => {
                warn!(
                    "summarizer failed for {}: {}, keeping previous summary",
                    session_id, e
                );
                record_summary_outcome("error", started.elapsed());
                return;
            }
            Err(_) => {
                warn!(
                    "summarizer timed out after {:?} for {}, keeping previous summary",
                    self.summary_timeout, session_id
                );
                record_summary_outcome("timeout", started.elapsed());
                return;
            }
        };

        if let Err(e) = self.store.store_summary(session_id, &updated) {
            warn!("failed to persist summary for {}: {}", session_id, e);
            record_summary_outcome("error", started.elapsed());
            return;
        }

        record_summary_outcome("updated", started.elapsed());
    }

    /// Run a closure against the session's buffer, seeding it from the
    /// persisted transcript on first touch
    ///
    /// Storage reads happen before taking the lock; the lock is never held
    /// across an await point.
    fn with_buffer<R>(&self, session_id: &str, f: impl FnOnce(&mut RecentBuffer) -> R) -> Result<R> {
        if !self.lock_buffers()?.contains_key(session_id) {
            let seeded = self.seeded_buffer(session_id)?;
            self.lock_buffers()?
                .entry(session_id.to_string())
                .or_insert(seeded);
        }

        let mut buffers = self.lock_buffers()?;
        let buffer = buffers
            .entry(session_id.to_string())
            .or_insert_with(|| RecentBuffer::new(self.buffer_window));
        Ok(f(buffer))
    }

    fn seeded_buffer(&self, session_id: &str) -> Result<RecentBuffer> {
        // A turn costs at least one token unless it is entirely empty, so
        // budget-many rows always cover the window.
        let fetch = self.buffer_window.max(1);
        let entries = self.store.recent_transcript(session_id, fetch)?;
        let turns = entries
            .into_iter()
            .map(|entry| Turn::new(entry.message, entry.response));
        Ok(RecentBuffer::from_newest(self.buffer_window, turns))
    }

    fn lock_buffers(&self) -> Result<MutexGuard<'_, HashMap<String, RecentBuffer>>> {
        Ok(self
            .buffers
            .lock()
            .map_err(|_| MnemoError::Storage("session buffer lock poisoned".to_string()))?)
    }
}
