//! The session state store.
//!
//! [`SessionStore`] is a cheaply cloneable handle to one conversation's
//! state map. Four generic operations define the merge semantics:
//!
//! - [`put`](SessionStore::put) — plain write (whole-value replace)
//! - [`set_once_if_absent`](SessionStore::set_once_if_absent) —
//!   first-write-wins; silently a no-op when the key is already set
//! - [`upsert_map_entry`](SessionStore::upsert_map_entry) — creates the
//!   nested map if absent, otherwise overwrites one entry
//! - [`append_to_list_entry`](SessionStore::append_to_list_entry) —
//!   creates the nested map and/or list if absent, otherwise appends;
//!   duplicates permitted
//!
//! Each operation takes the internal lock exactly once, so concurrent
//! callers within a turn serialize and no append is ever lost.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::debug;

use reel_core::{ScenePrompt, SessionId};

use crate::errors::SessionError;
use crate::keys;

/// Handle to one conversation's shared state.
///
/// Clones share the same underlying map.
#[derive(Clone)]
pub struct SessionStore {
    session_id: SessionId,
    state: Arc<Mutex<Map<String, Value>>>,
}

impl SessionStore {
    /// Create a fresh store for a new conversation.
    ///
    /// The first-request flag starts true; it transitions to false exactly
    /// once, on the first observed user request.
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        let mut state = Map::new();
        let _ = state.insert(keys::FIRST_REQUEST.to_owned(), Value::Bool(true));
        Self {
            session_id,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Rehydrate a store from a previously persisted snapshot.
    #[must_use]
    pub fn from_snapshot(session_id: SessionId, snapshot: Map<String, Value>) -> Self {
        Self {
            session_id,
            state: Arc::new(Mutex::new(snapshot)),
        }
    }

    /// The session this store belongs to.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    // ─────────────────────────────────────────────────────────────────────
    // Generic operations
    // ─────────────────────────────────────────────────────────────────────

    /// Read a key, falling back to `default` when unset.
    #[must_use]
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.state.lock().get(key).cloned().unwrap_or(default)
    }

    /// Read a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.lock().get(key).cloned()
    }

    /// Plain write — replaces any existing value for `key`.
    pub fn put(&self, key: &str, value: Value) {
        let _ = self.state.lock().insert(key.to_owned(), value);
    }

    /// First-write-wins write.
    ///
    /// Returns `true` when the value was written; a later call for the same
    /// key is a silent no-op and returns `false`.
    pub fn set_once_if_absent(&self, key: &str, value: Value) -> bool {
        let mut state = self.state.lock();
        if state.contains_key(key) {
            debug!(session_id = %self.session_id, key, "set_once_if_absent: already set, ignoring");
            return false;
        }
        let _ = state.insert(key.to_owned(), value);
        true
    }

    /// Overwrite one entry of a nested map, creating the map if absent.
    ///
    /// A non-object value under `map_key` is replaced by a fresh map.
    pub fn upsert_map_entry(&self, map_key: &str, entry_key: &str, value: Value) {
        let mut state = self.state.lock();
        let slot = state
            .entry(map_key.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(map) = slot {
            let _ = map.insert(entry_key.to_owned(), value);
        }
    }

    /// Append to a list nested under `map_key` → `entry_key`, creating the
    /// map and/or list if absent. Duplicates are permitted; lists only ever
    /// grow.
    pub fn append_to_list_entry(&self, map_key: &str, entry_key: &str, value: Value) {
        let mut state = self.state.lock();
        let slot = state
            .entry(map_key.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(map) = slot {
            let entry = map
                .entry(entry_key.to_owned())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = entry {
                list.push(value);
            } else {
                *entry = Value::Array(vec![value]);
            }
        }
    }

    /// Clone the full state map for end-of-turn persistence by the host.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.state.lock().clone()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Typed accessors for the well-known keys
    // ─────────────────────────────────────────────────────────────────────

    /// The acting identity, once set.
    #[must_use]
    pub fn acting_user_id(&self) -> Option<String> {
        self.get_string(keys::ACTING_USER_ID)
    }

    /// Capture the acting identity. First-write-wins; returns whether the
    /// write happened.
    pub fn set_acting_user_once(&self, user_id: &str) -> bool {
        self.set_once_if_absent(keys::ACTING_USER_ID, Value::String(user_id.to_owned()))
    }

    /// The conversation title, once captured.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.get_string(keys::TITLE)
    }

    /// Capture the conversation title. First-write-wins; returns whether
    /// the write happened.
    pub fn set_title_once(&self, title: &str) -> bool {
        self.set_once_if_absent(keys::TITLE, Value::String(title.to_owned()))
    }

    /// Replace the whole theme list (scene-label → summary).
    pub fn replace_theme_list(&self, themes: &HashMap<String, String>) -> Result<(), SessionError> {
        let value = serde_json::to_value(themes).map_err(|source| SessionError::Serialize {
            key: keys::THEME_LIST.to_owned(),
            source,
        })?;
        self.put(keys::THEME_LIST, value);
        Ok(())
    }

    /// The current theme list.
    pub fn theme_list(&self) -> Result<HashMap<String, String>, SessionError> {
        self.get_typed(keys::THEME_LIST)
    }

    /// Upsert one scene's structured prompt under `scene_config`.
    pub fn upsert_scene_prompt(
        &self,
        scene_id: &str,
        prompt: &ScenePrompt,
    ) -> Result<(), SessionError> {
        let value = serde_json::to_value(prompt).map_err(|source| SessionError::Serialize {
            key: keys::SCENE_CONFIG.to_owned(),
            source,
        })?;
        self.upsert_map_entry(keys::SCENE_CONFIG, scene_id, value);
        Ok(())
    }

    /// The current scene configuration (canonical scene id → prompt).
    pub fn scene_config(&self) -> Result<HashMap<String, ScenePrompt>, SessionError> {
        self.get_typed(keys::SCENE_CONFIG)
    }

    /// Append one result URI to a scene's history. Lists only grow; a
    /// re-rendered scene keeps its earlier artifacts.
    pub fn append_movie_url(&self, scene_id: &str, uri: &str) {
        self.append_to_list_entry(keys::MOVIE_URLS, scene_id, Value::String(uri.to_owned()));
    }

    /// Snapshot of all scenes' result URI histories.
    pub fn movie_urls(&self) -> Result<HashMap<String, Vec<String>>, SessionError> {
        self.get_typed(keys::MOVIE_URLS)
    }

    /// Consume the first-request flag.
    ///
    /// Returns `true` exactly once per session — on that call the flag
    /// transitions true→false atomically.
    pub fn take_first_request(&self) -> bool {
        let mut state = self.state.lock();
        let first = matches!(state.get(keys::FIRST_REQUEST), Some(Value::Bool(true)) | None);
        if first {
            let _ = state.insert(keys::FIRST_REQUEST.to_owned(), Value::Bool(false));
        }
        first
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.state.lock().get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn get_typed<T: serde::de::DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, SessionError> {
        match self.get(key) {
            None => Ok(T::default()),
            Some(value) => {
                serde_json::from_value(value).map_err(|source| SessionError::Malformed {
                    key: key.to_owned(),
                    source,
                })
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session_id", &self.session_id)
            .field("keys", &self.state.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(SessionId::from("sess-1"))
    }

    // ── first-write-wins ────────────────────────────────────────────

    #[test]
    fn set_once_first_write_wins() {
        let store = store();
        assert!(store.set_once_if_absent(keys::TITLE, Value::String("A".into())));
        assert!(!store.set_once_if_absent(keys::TITLE, Value::String("B".into())));
        assert_eq!(store.title().as_deref(), Some("A"));
    }

    #[test]
    fn acting_user_is_immutable_once_set() {
        let store = store();
        assert!(store.set_acting_user_once("user-1"));
        assert!(!store.set_acting_user_once("user-2"));
        assert_eq!(store.acting_user_id().as_deref(), Some("user-1"));
    }

    // ── upsert ──────────────────────────────────────────────────────

    #[test]
    fn upsert_creates_map_then_overwrites_entry() {
        let store = store();
        store.upsert_map_entry("m", "k", Value::from(1));
        store.upsert_map_entry("m", "k", Value::from(2));
        assert_eq!(store.get("m").unwrap()["k"], Value::from(2));
    }

    #[test]
    fn upsert_keeps_sibling_entries() {
        let store = store();
        store.upsert_map_entry("m", "a", Value::from(1));
        store.upsert_map_entry("m", "b", Value::from(2));
        let m = store.get("m").unwrap();
        assert_eq!(m["a"], Value::from(1));
        assert_eq!(m["b"], Value::from(2));
    }

    #[test]
    fn scene_prompt_upsert_roundtrip() {
        let store = store();
        let prompt = ScenePrompt {
            description: "opening shot".into(),
            ..ScenePrompt::default()
        };
        store.upsert_scene_prompt("scene1", &prompt).unwrap();
        let config = store.scene_config().unwrap();
        assert_eq!(config["scene1"].description, "opening shot");
    }

    // ── append ──────────────────────────────────────────────────────

    #[test]
    fn append_creates_and_grows_list() {
        let store = store();
        store.append_movie_url("scene1", "gs://b/a.mp4");
        store.append_movie_url("scene1", "gs://b/b.mp4");
        let urls = store.movie_urls().unwrap();
        assert_eq!(urls["scene1"], vec!["gs://b/a.mp4", "gs://b/b.mp4"]);
    }

    #[test]
    fn append_permits_duplicates() {
        let store = store();
        store.append_movie_url("scene1", "gs://b/a.mp4");
        store.append_movie_url("scene1", "gs://b/a.mp4");
        assert_eq!(store.movie_urls().unwrap()["scene1"].len(), 2);
    }

    #[tokio::test]
    async fn concurrent_appends_lose_nothing() {
        let store = store();
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append_movie_url("scene1", &format!("gs://b/{i}.mp4"));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.movie_urls().unwrap()["scene1"].len(), 32);
    }

    // ── theme list ──────────────────────────────────────────────────

    #[test]
    fn theme_list_is_whole_value_replace() {
        let store = store();
        let mut themes = HashMap::new();
        let _ = themes.insert("scene1".to_owned(), "a station at dawn".to_owned());
        let _ = themes.insert("scene2".to_owned(), "the crossing".to_owned());
        store.replace_theme_list(&themes).unwrap();

        let mut replacement = HashMap::new();
        let _ = replacement.insert("scene1".to_owned(), "rewritten".to_owned());
        store.replace_theme_list(&replacement).unwrap();

        let current = store.theme_list().unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current["scene1"], "rewritten");
    }

    // ── first-request flag ──────────────────────────────────────────

    #[test]
    fn first_request_flag_flips_exactly_once() {
        let store = store();
        assert!(store.take_first_request());
        assert!(!store.take_first_request());
        assert!(!store.take_first_request());
    }

    // ── snapshot ────────────────────────────────────────────────────

    #[test]
    fn snapshot_rehydrates() {
        let store = store();
        assert!(store.set_title_once("A"));
        store.append_movie_url("scene1", "gs://b/a.mp4");
        let snapshot = store.snapshot();

        let restored = SessionStore::from_snapshot(SessionId::from("sess-1"), snapshot);
        assert_eq!(restored.title().as_deref(), Some("A"));
        assert_eq!(restored.movie_urls().unwrap()["scene1"].len(), 1);
        // title stays first-write-wins across rehydration
        assert!(!restored.set_title_once("B"));
    }

    #[test]
    fn get_or_returns_default_when_unset() {
        let store = store();
        assert_eq!(store.get_or("missing", Value::from(0)), Value::from(0));
    }
}
