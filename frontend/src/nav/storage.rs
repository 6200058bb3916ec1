//! Persistent key-value storage for user preferences (companion pages,
//! bookmarks). Browser local storage in the web build, memory elsewhere.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}

/// Stored value under `key`; missing or unreadable entries yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("ignoring unreadable `{key}` preference: {err}");
            None
        }
    }
}

pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, raw),
        Err(err) => log::error!("failed to serialize `{key}` preference: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_values_survive_and_garbage_is_ignored() {
        let store = MemoryStore::default();
        save_json(&store, "paths", &vec!["/doc".to_string()]);
        assert_eq!(load_json::<Vec<String>>(&store, "paths"), Some(vec!["/doc".to_string()]));

        store.set("broken", "{not json".to_string());
        assert_eq!(load_json::<Vec<String>>(&store, "broken"), None);
        assert_eq!(load_json::<Vec<String>>(&store, "missing"), None);
    }
}
