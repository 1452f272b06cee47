//! SQLite persistence for sessions and transcripts
//!
//! A session row carries the metadata document, the monotonic turn counter,
//! and the running summary. The transcript table is the append-only log of
//! every saved turn. All writes are column-scoped upserts so that touching
//! one field never resets another.

pub mod types;

pub use types::{SessionInfo, TranscriptEntry};

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{MnemoError, Result};

/// SQLite-backed store for session state and transcripts
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at the given path
    ///
    /// Parent directories are created as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use mnemo::storage::SqliteStore;
    ///
    /// let store = SqliteStore::new("/tmp/mnemo_doctest.db").unwrap();
    /// ```
    pub fn new<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })
                .map_err(|e| MnemoError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("failed to open database at {}", self.db_path.display()))
            .map_err(|e| MnemoError::Storage(e.to_string()))?;
        Ok(conn)
    }

    fn init(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                metadata   TEXT NOT NULL DEFAULT '{}',
                turn_count INTEGER NOT NULL DEFAULT 0,
                summary    TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS transcript (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                message    TEXT NOT NULL,
                response   TEXT NOT NULL,
                created_at TEXT NOT NULL,
                tags       TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_transcript_session
                ON transcript (session_id, id);",
        )
        .context("failed to create tables")
        .map_err(|e| MnemoError::Storage(e.to_string()))?;

        debug!("database ready at {}", self.db_path.display());
        Ok(())
    }

    /// Raw metadata JSON for a session, `None` when the session has no row
    pub fn fetch_metadata(&self, session_id: &str) -> Result<Option<String>> {
        let conn = self.connect()?;

        let raw = conn
            .query_row(
                "SELECT metadata FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()
            .context("failed to read session metadata")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        Ok(raw)
    }

    /// Replace the metadata document for a session
    ///
    /// Creates the session row when missing. Only the metadata column and
    /// `updated_at` are written, the turn counter and summary are untouched.
    pub fn store_metadata(&self, session_id: &str, metadata: &str) -> Result<()> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO sessions (session_id, metadata, turn_count, summary, created_at, updated_at)
             VALUES (?1, ?2, 0, '', ?3, ?3)
             ON CONFLICT(session_id) DO UPDATE SET
                 metadata = excluded.metadata,
                 updated_at = excluded.updated_at",
            params![session_id, metadata, now],
        )
        .context("failed to store session metadata")
        .map_err(|e| MnemoError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Persisted turn counter, zero when the session has no row
    pub fn turn_count(&self, session_id: &str) -> Result<u64> {
        let conn = self.connect()?;

        let count: Option<i64> = conn
            .query_row(
                "SELECT turn_count FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()
            .context("failed to read turn count")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        Ok(count.unwrap_or(0) as u64)
    }

    /// Running summary text, empty when none has been stored
    pub fn summary(&self, session_id: &str) -> Result<String> {
        let conn = self.connect()?;

        let summary: Option<String> = conn
            .query_row(
                "SELECT summary FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()
            .context("failed to read summary")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        Ok(summary.unwrap_or_default())
    }

    /// Replace the running summary for a session
    pub fn store_summary(&self, session_id: &str, summary: &str) -> Result<()> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO sessions (session_id, metadata, turn_count, summary, created_at, updated_at)
             VALUES (?1, '{}', 0, ?2, ?3, ?3)
             ON CONFLICT(session_id) DO UPDATE SET
                 summary = excluded.summary,
                 updated_at = excluded.updated_at",
            params![session_id, summary, now],
        )
        .context("failed to store summary")
        .map_err(|e| MnemoError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Append a turn to the transcript and advance the turn counter
    ///
    /// Both writes happen in one transaction and the increment runs inside
    /// SQL, so concurrent writers on the same session cannot lose updates.
    /// Returns the counter value after the increment.
    pub fn record_turn(
        &self,
        session_id: &str,
        message: &str,
        response: &str,
        tags: Option<&serde_json::Value>,
    ) -> Result<u64> {
        let mut conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        let tags_json = tags.map(|t| t.to_string());

        let tx = conn
            .transaction()
            .context("failed to start transaction")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO transcript (session_id, message, response, created_at, tags)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, message, response, now, tags_json],
        )
        .context("failed to append transcript entry")
        .map_err(|e| MnemoError::Storage(e.to_string()))?;

        let count: i64 = tx
            .query_row(
                "INSERT INTO sessions (session_id, metadata, turn_count, summary, created_at, updated_at)
                 VALUES (?1, '{}', 1, '', ?2, ?2)
                 ON CONFLICT(session_id) DO UPDATE SET
                     turn_count = turn_count + 1,
                     updated_at = excluded.updated_at
                 RETURNING turn_count",
                params![session_id, now],
                |row| row.get(0),
            )
            .context("failed to advance turn count")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        tx.commit()
            .context("failed to commit turn")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        Ok(count as u64)
    }

    /// Most recent transcript entries, newest first
    pub fn recent_transcript(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<TranscriptEntry>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(
                "SELECT message, response, created_at, tags
                 FROM transcript
                 WHERE session_id = ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .context("failed to prepare transcript query")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![session_id, limit as i64], |row| {
                let tags_json: Option<String> = row.get(3)?;
                Ok(TranscriptEntry {
                    message: row.get(0)?,
                    response: row.get(1)?,
                    created_at: row.get(2)?,
                    tags: tags_json.and_then(|t| serde_json::from_str(&t).ok()),
                })
            })
            .context("failed to read transcript")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(
                row.context("failed to parse transcript row")
                    .map_err(|e| MnemoError::Storage(e.to_string()))?,
            );
        }

        Ok(entries)
    }

    /// Total number of transcript entries for a session
    pub fn transcript_count(&self, session_id: &str) -> Result<u64> {
        let conn = self.connect()?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM transcript WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .context("failed to count transcript entries")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        Ok(count as u64)
    }

    /// All stored sessions, most recently touched first
    pub fn list_sessions(&self) -> Result<Vec<SessionInfo>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(
                "SELECT session_id, turn_count, created_at, updated_at
                 FROM sessions
                 ORDER BY updated_at DESC",
            )
            .context("failed to prepare session query")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let turn_count: i64 = row.get(1)?;
                let created_at: String = row.get(2)?;
                let updated_at: String = row.get(3)?;
                Ok(SessionInfo {
                    session_id: row.get(0)?,
                    turn_count: turn_count as u64,
                    created_at: parse_timestamp(&created_at),
                    updated_at: parse_timestamp(&updated_at),
                })
            })
            .context("failed to list sessions")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(
                row.context("failed to parse session row")
                    .map_err(|e| MnemoError::Storage(e.to_string()))?,
            );
        }

        Ok(sessions)
    }

    /// Remove a session and its transcript, a no-op when the session is unknown
    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut conn = self.connect()?;

        let tx = conn
            .transaction()
            .context("failed to start transaction")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        tx.execute(
            "DELETE FROM transcript WHERE session_id = ?1",
            params![session_id],
        )
        .context("failed to delete transcript")
        .map_err(|e| MnemoError::Storage(e.to_string()))?;

        tx.execute(
            "DELETE FROM sessions WHERE session_id = ?1",
            params![session_id],
        )
        .context("failed to delete session")
        .map_err(|e| MnemoError::Storage(e.to_string()))?;

        tx.commit()
            .context("failed to commit delete")
            .map_err(|e| MnemoError::Storage(e.to_string()))?;

        debug!("deleted session {}", session_id);
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
