//! Durable per-session metadata documents
//!
//! Each session owns one JSON document of arbitrary nested shape. Writes
//! merge at the top level only; reads walk dot paths into the nesting.
//! Deeper updates are read-modify-write on the parent object, performed by
//! the caller.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;
use crate::storage::SqliteStore;

/// Key/value store over the per-session metadata document
///
/// Reads are best-effort: a missing session or a corrupt persisted document
/// degrades to an empty document rather than an error.
#[derive(Clone)]
pub struct MetadataStore {
    store: Arc<SqliteStore>,
}

impl MetadataStore {
    /// Create a metadata store over the given backing storage
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Full metadata document for a session, empty when none exists
    pub fn get_document(&self, session_id: &str) -> Result<Map<String, Value>> {
        let raw = match self.store.fetch_metadata(session_id)? {
            Some(raw) => raw,
            None => return Ok(Map::new()),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => {
                warn!("metadata for session {} is not an object, ignoring", session_id);
                Ok(Map::new())
            }
            Err(e) => {
                warn!("corrupt metadata for session {}: {}", session_id, e);
                Ok(Map::new())
            }
        }
    }

    /// Merge a patch into the document at the top level
    ///
    /// Patch keys overwrite existing top-level keys wholesale; keys absent
    /// from the patch are untouched. There is no deep merge: writing
    /// `{"vars": {...}}` replaces the entire `vars` object.
    pub fn set_document(&self, session_id: &str, patch: Map<String, Value>) -> Result<()> {
        let mut document = self.get_document(session_id)?;
        for (key, value) in patch {
            document.insert(key, value);
        }
        self.write_document(session_id, &document)
    }

    /// Read a value by dot path
    ///
    /// `"vars.monthly"` walks nested objects. Returns `None` as soon as a
    /// segment is missing or a non-object is hit mid-path. A key holding
    /// JSON `null` reads as `Some(Value::Null)`, which is distinct from a
    /// missing key.
    pub fn get_value(&self, session_id: &str, dotted_key: &str) -> Result<Option<Value>> {
        let document = Value::Object(self.get_document(session_id)?);

        let mut current = &document;
        for segment in dotted_key.split('.') {
            match current {
                Value::Object(map) => match map.get(segment) {
                    Some(value) => current = value,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            }
        }

        Ok(Some(current.clone()))
    }

    /// Write a single top-level key
    ///
    /// Dots in `key` are not interpreted here; deeper updates go through
    /// [`get_value`](Self::get_value) on the parent object followed by a
    /// write of the whole object.
    pub fn update_value(&self, session_id: &str, key: &str, value: Value) -> Result<()> {
        let mut patch = Map::new();
        patch.insert(key.to_string(), value);
        self.set_document(session_id, patch)
    }

    /// Delete a top-level key, a no-op when the key is absent
    pub fn remove_value(&self, session_id: &str, key: &str) -> Result<()> {
        let mut document = self.get_document(session_id)?;
        if document.remove(key).is_some() {
            self.write_document(session_id, &document)?;
        }
        Ok(())
    }

    fn write_document(&self, session_id: &str, document: &Map<String, Value>) -> Result<()> {
        let raw = serde_json::to_string(document)?;
        self.store.store_metadata(session_id, &raw)
    }
}
