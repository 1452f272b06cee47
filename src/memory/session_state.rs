//! Typed accessors over the session metadata document
//!
//! Everything here is sugar over [`MetadataStore`]: each accessor reads or
//! writes well-known keys in the per-session document. Key names are part
//! of the storage format and must stay stable so existing persisted
//! sessions keep working.

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::memory::MetadataStore;

const KEY_USER_INFO: &str = "user_info";
const KEY_OBJECTIVE: &str = "conversation_objective";
const KEY_CONVERSATION_STATE: &str = "conversation_state";
const KEY_WELCOME_DONE: &str = "welcome_done";
const KEY_REASONS: &str = "reasons";
const KEY_REASONS_CONFIRMED: &str = "reasons_confirmed";
const KEY_VARS_INFO_GIVEN: &str = "vars_info_given";
const KEY_VARS: &str = "vars";

const VAR_FIELDS: [&str; 3] = ["monthly", "duration", "rate"];

/// Domain view of one session's metadata
///
/// Binds a [`MetadataStore`] to a single session id so call sites read
/// naturally. Cloning is cheap, all state lives in storage.
#[derive(Clone)]
pub struct SessionState {
    metadata: MetadataStore,
    session_id: String,
}

impl SessionState {
    /// Bind a metadata store to a session
    pub fn new(metadata: MetadataStore, session_id: impl Into<String>) -> Self {
        Self {
            metadata,
            session_id: session_id.into(),
        }
    }

    /// Session this state is bound to
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    // --- user info ---

    /// Free-form user profile object, empty when unset
    pub fn user_info(&self) -> Result<Map<String, Value>> {
        self.object_value(KEY_USER_INFO)
    }

    /// Replace the whole user profile object
    pub fn set_user_info(&self, info: Map<String, Value>) -> Result<()> {
        self.metadata
            .update_value(&self.session_id, KEY_USER_INFO, Value::Object(info))
    }

    /// Update one field of the user profile, keeping the rest
    pub fn update_user_info(&self, key: &str, value: Value) -> Result<()> {
        let mut info = self.user_info()?;
        info.insert(key.to_string(), value);
        self.set_user_info(info)
    }

    // --- conversation objective ---

    /// Current conversation objective, empty string when unset
    pub fn objective(&self) -> Result<String> {
        let value = self.metadata.get_value(&self.session_id, KEY_OBJECTIVE)?;
        Ok(value
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default())
    }

    /// Set the conversation objective
    pub fn set_objective(&self, objective: &str) -> Result<()> {
        self.metadata
            .update_value(&self.session_id, KEY_OBJECTIVE, json!(objective))
    }

    /// Remove the conversation objective entirely
    pub fn clear_objective(&self) -> Result<()> {
        self.metadata.remove_value(&self.session_id, KEY_OBJECTIVE)
    }

    // --- conversation state ---

    /// Agent-defined conversation state object, empty when unset
    pub fn conversation_state(&self) -> Result<Map<String, Value>> {
        self.object_value(KEY_CONVERSATION_STATE)
    }

    /// Replace the whole conversation state object
    pub fn set_conversation_state(&self, state: Map<String, Value>) -> Result<()> {
        self.metadata.update_value(
            &self.session_id,
            KEY_CONVERSATION_STATE,
            Value::Object(state),
        )
    }

    /// Update one field of the conversation state, keeping the rest
    pub fn update_conversation_state(&self, key: &str, value: Value) -> Result<()> {
        let mut state = self.conversation_state()?;
        state.insert(key.to_string(), value);
        self.set_conversation_state(state)
    }

    // --- welcome flag ---

    /// Whether the welcome flow already ran for this session
    pub fn is_welcome_done(&self) -> Result<bool> {
        self.bool_value(KEY_WELCOME_DONE)
    }

    /// Mark the welcome flow as done (or not)
    pub fn set_welcome_done(&self, done: bool) -> Result<()> {
        self.metadata
            .update_value(&self.session_id, KEY_WELCOME_DONE, json!(done))
    }

    // --- reasons ---

    /// Ordered list of stated reasons, empty when unset
    pub fn reasons(&self) -> Result<Vec<String>> {
        let value = self.metadata.get_value(&self.session_id, KEY_REASONS)?;
        let reasons = value
            .and_then(|v| match v {
                Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(String::from))
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default();
        Ok(reasons)
    }

    /// Append a reason unless it is already listed
    pub fn add_reason(&self, reason: &str) -> Result<()> {
        let mut reasons = self.reasons()?;
        if reasons.iter().any(|r| r == reason) {
            return Ok(());
        }
        reasons.push(reason.to_string());
        self.metadata
            .update_value(&self.session_id, KEY_REASONS, json!(reasons))
    }

    /// Remove a reason by value, a no-op when it is not listed
    pub fn remove_reason(&self, reason: &str) -> Result<()> {
        let mut reasons = self.reasons()?;
        let before = reasons.len();
        reasons.retain(|r| r != reason);
        if reasons.len() == before {
            return Ok(());
        }
        self.metadata
            .update_value(&self.session_id, KEY_REASONS, json!(reasons))
    }

    /// Whether the user confirmed the collected reasons
    pub fn is_reasons_confirmed(&self) -> Result<bool> {
        self.bool_value(KEY_REASONS_CONFIRMED)
    }

    /// Record confirmation of the collected reasons
    pub fn set_reasons_confirmed(&self, confirmed: bool) -> Result<()> {
        self.metadata
            .update_value(&self.session_id, KEY_REASONS_CONFIRMED, json!(confirmed))
    }

    // --- variables record ---

    /// Whether the variables explanation was already given
    pub fn is_vars_info_given(&self) -> Result<bool> {
        self.bool_value(KEY_VARS_INFO_GIVEN)
    }

    /// Record that the variables explanation was given
    pub fn set_vars_info_given(&self, given: bool) -> Result<()> {
        self.metadata
            .update_value(&self.session_id, KEY_VARS_INFO_GIVEN, json!(given))
    }

    /// The fixed-shape variables record
    ///
    /// Always contains the `monthly`, `duration` and `rate` fields; each is
    /// JSON `null` until set.
    pub fn variables(&self) -> Result<Map<String, Value>> {
        let value = self.metadata.get_value(&self.session_id, KEY_VARS)?;
        match value {
            Some(Value::Object(mut map)) => {
                for field in VAR_FIELDS {
                    map.entry(field.to_string()).or_insert(Value::Null);
                }
                Ok(map)
            }
            _ => Ok(default_variables()),
        }
    }

    /// One field of the variables record, `null` when unset
    pub fn variable(&self, name: &str) -> Result<Value> {
        let vars = self.variables()?;
        Ok(vars.get(name).cloned().unwrap_or(Value::Null))
    }

    /// Set one field of the variables record, keeping the others
    pub fn set_variable(&self, name: &str, value: Value) -> Result<()> {
        let mut vars = self.variables()?;
        vars.insert(name.to_string(), value);
        self.metadata
            .update_value(&self.session_id, KEY_VARS, Value::Object(vars))
    }

    /// Set any subset of the variables record in one write
    ///
    /// Fields passed as `None` keep their stored value.
    pub fn set_variables(
        &self,
        monthly: Option<f64>,
        duration: Option<f64>,
        rate: Option<f64>,
    ) -> Result<()> {
        let mut vars = self.variables()?;
        if let Some(monthly) = monthly {
            vars.insert("monthly".to_string(), json!(monthly));
        }
        if let Some(duration) = duration {
            vars.insert("duration".to_string(), json!(duration));
        }
        if let Some(rate) = rate {
            vars.insert("rate".to_string(), json!(rate));
        }
        self.metadata
            .update_value(&self.session_id, KEY_VARS, Value::Object(vars))
    }

    /// True once all three variable fields hold non-null values
    pub fn is_variables_complete(&self) -> Result<bool> {
        let vars = self.variables()?;
        Ok(VAR_FIELDS
            .iter()
            .all(|field| vars.get(*field).map(|v| !v.is_null()).unwrap_or(false)))
    }

    /// Reset all variable fields to null and drop the explanation flag
    pub fn reset_variables(&self) -> Result<()> {
        let mut patch = Map::new();
        patch.insert(KEY_VARS.to_string(), Value::Object(default_variables()));
        patch.insert(KEY_VARS_INFO_GIVEN.to_string(), json!(false));
        self.metadata.set_document(&self.session_id, patch)
    }

    fn object_value(&self, key: &str) -> Result<Map<String, Value>> {
        let value = self.metadata.get_value(&self.session_id, key)?;
        match value {
            Some(Value::Object(map)) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn bool_value(&self, key: &str) -> Result<bool> {
        let value = self.metadata.get_value(&self.session_id, key)?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

fn default_variables() -> Map<String, Value> {
    let mut vars = Map::new();
    for field in VAR_FIELDS {
        vars.insert(field.to_string(), Value::Null);
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_state() -> (SessionState, MetadataStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::new(dir.path().join("test.db")).unwrap());
        let metadata = MetadataStore::new(store);
        let state = SessionState::new(metadata.clone(), "s1");
        (state, metadata, dir)
    }

    #[test]
    fn test_defaults() {
        let (state, _metadata, _dir) = create_test_state();

        assert!(state.user_info().unwrap().is_empty());
        assert_eq!(state.objective().unwrap(), "");
        assert!(state.conversation_state().unwrap().is_empty());
        assert!(!state.is_welcome_done().unwrap());
        assert!(state.reasons().unwrap().is_empty());
        assert!(!state.is_reasons_confirmed().unwrap());
        assert!(!state.is_vars_info_given().unwrap());
        assert!(!state.is_variables_complete().unwrap());
    }

    #[test]
    fn test_variables_default_shape() {
        let (state, _metadata, _dir) = create_test_state();

        let vars = state.variables().unwrap();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars.get("monthly"), Some(&Value::Null));
        assert_eq!(vars.get("duration"), Some(&Value::Null));
        assert_eq!(vars.get("rate"), Some(&Value::Null));
    }

    #[test]
    fn test_welcome_flag_roundtrip() {
        let (state, _metadata, _dir) = create_test_state();

        state.set_welcome_done(true).unwrap();
        assert!(state.is_welcome_done().unwrap());

        state.set_welcome_done(false).unwrap();
        assert!(!state.is_welcome_done().unwrap());
    }

    #[test]
    fn test_objective_set_and_clear() {
        let (state, metadata, _dir) = create_test_state();

        state.set_objective("compare offers").unwrap();
        assert_eq!(state.objective().unwrap(), "compare offers");

        state.clear_objective().unwrap();
        assert_eq!(state.objective().unwrap(), "");

        // The key really is gone, not just empty
        let doc = metadata.get_document("s1").unwrap();
        assert!(!doc.contains_key("conversation_objective"));
    }

    #[test]
    fn test_reasons_add_dedups() {
        let (state, _metadata, _dir) = create_test_state();

        state.add_reason("car").unwrap();
        state.add_reason("house").unwrap();
        state.add_reason("car").unwrap();

        assert_eq!(state.reasons().unwrap(), vec!["car", "house"]);
    }

    #[test]
    fn test_remove_reason() {
        let (state, _metadata, _dir) = create_test_state();

        state.add_reason("car").unwrap();
        state.add_reason("house").unwrap();

        state.remove_reason("car").unwrap();
        assert_eq!(state.reasons().unwrap(), vec!["house"]);

        // Removing an unlisted reason is a no-op
        state.remove_reason("boat").unwrap();
        assert_eq!(state.reasons().unwrap(), vec!["house"]);
    }

    #[test]
    fn test_user_info_update_keeps_other_fields() {
        let (state, _metadata, _dir) = create_test_state();

        state.update_user_info("name", json!("alice")).unwrap();
        state.update_user_info("age", json!(30)).unwrap();

        let info = state.user_info().unwrap();
        assert_eq!(info.get("name"), Some(&json!("alice")));
        assert_eq!(info.get("age"), Some(&json!(30)));
    }

    #[test]
    fn test_conversation_state_update() {
        let (state, _metadata, _dir) = create_test_state();

        state.update_conversation_state("phase", json!("intro")).unwrap();
        state.update_conversation_state("step", json!(2)).unwrap();

        let conv = state.conversation_state().unwrap();
        assert_eq!(conv.get("phase"), Some(&json!("intro")));
        assert_eq!(conv.get("step"), Some(&json!(2)));
    }

    #[test]
    fn test_set_variables_partial_update() {
        let (state, _metadata, _dir) = create_test_state();

        state.set_variables(Some(500.0), None, None).unwrap();
        assert_eq!(state.variable("monthly").unwrap(), json!(500.0));
        assert_eq!(state.variable("duration").unwrap(), Value::Null);

        state.set_variables(None, Some(24.0), Some(3.5)).unwrap();
        assert_eq!(state.variable("monthly").unwrap(), json!(500.0));
        assert_eq!(state.variable("duration").unwrap(), json!(24.0));
        assert_eq!(state.variable("rate").unwrap(), json!(3.5));
    }

    #[test]
    fn test_variables_completeness() {
        let (state, _metadata, _dir) = create_test_state();

        assert!(!state.is_variables_complete().unwrap());

        state.set_variables(Some(500.0), Some(24.0), None).unwrap();
        assert!(!state.is_variables_complete().unwrap());

        state.set_variables(None, None, Some(3.5)).unwrap();
        assert!(state.is_variables_complete().unwrap());
    }

    #[test]
    fn test_reset_variables() {
        let (state, _metadata, _dir) = create_test_state();

        state.set_variables(Some(500.0), Some(24.0), Some(3.5)).unwrap();
        state.set_vars_info_given(true).unwrap();

        state.reset_variables().unwrap();

        assert!(!state.is_variables_complete().unwrap());
        assert_eq!(state.variable("monthly").unwrap(), Value::Null);
        assert!(!state.is_vars_info_given().unwrap());
    }

    #[test]
    fn test_persisted_key_names_are_stable() {
        let (state, metadata, _dir) = create_test_state();

        state.set_welcome_done(true).unwrap();
        state.add_reason("car").unwrap();
        state.set_reasons_confirmed(true).unwrap();
        state.set_vars_info_given(true).unwrap();
        state.set_variables(Some(1.0), None, None).unwrap();

        let doc = metadata.get_document("s1").unwrap();
        for key in [
            "welcome_done",
            "reasons",
            "reasons_confirmed",
            "vars_info_given",
            "vars",
        ] {
            assert!(doc.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn test_state_survives_rebinding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");

        {
            let store = Arc::new(SqliteStore::new(&path).unwrap());
            let state = SessionState::new(MetadataStore::new(store), "s1");
            state.set_objective("refinance").unwrap();
            state.add_reason("rate drop").unwrap();
        }

        let store = Arc::new(SqliteStore::new(&path).unwrap());
        let state = SessionState::new(MetadataStore::new(store), "s1");
        assert_eq!(state.objective().unwrap(), "refinance");
        assert_eq!(state.reasons().unwrap(), vec!["rate drop"]);
    }
}
