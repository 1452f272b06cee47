use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable turn in a session's transcript
///
/// Entries are append-only and ordered by insertion; they form the durable
/// audit log independent of the buffer/summary state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    /// User message for this turn
    pub message: String,
    /// Agent response for this turn
    pub response: String,
    /// When the turn was recorded (RFC 3339)
    pub created_at: String,
    /// Optional free-form tags attached by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Value>,
}

/// Listing row for a stored session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Opaque session key
    pub session_id: String,
    /// Number of turns saved for the session
    pub turn_count: u64,
    /// When the session row was created
    pub created_at: DateTime<Utc>,
    /// When the session row was last touched
    pub updated_at: DateTime<Utc>,
}
