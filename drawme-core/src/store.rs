//! Key/value persistence backends.
//!
//! The editor mirrors each root collection under a fixed key (see
//! [`crate::schema`]). Backends only need `get` and `set` of JSON values:
//!
//! - [`MemoryStore`] keeps values in memory (tests, throwaway sessions).
//! - [`FileStore`] writes one pretty-printed JSON file per key.
//! - `LocalStorage` (feature `wasm`) uses the browser's `window.localStorage`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The storage backend is not reachable.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal key/value contract the editor persists through.
pub trait KeyValueStore {
    /// Read a value. Missing and unreadable entries are both `None`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend rejects the write.
    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Thread-safe in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = self
            .values
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Store writing `<key>.json` files into a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Opened file store at {}", data_dir.display());
        Ok(Self { data_dir })
    }

    /// Directory holding the files.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize_filename(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring corrupt value in {}: {e}", path.display());
                None
            }
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(self.path_for(key), json)?;
        Ok(())
    }
}

/// Browser `localStorage`, holding each value as a JSON string.
#[cfg(feature = "wasm")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

#[cfg(feature = "wasm")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".into()))?
            .local_storage()
            .ok()
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))
    }
}

#[cfg(feature = "wasm")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<Value> {
        let raw = Self::storage().ok()?.get_item(key).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring corrupt localStorage entry {key}: {e}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Self::storage()?
            .set_item(key, &raw)
            .map_err(|_| StoreError::Unavailable(format!("write of {key} rejected")))
    }
}

/// Sanitize a key for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_filename(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.get("components").is_none());
        store.set("components", &json!([1, 2])).expect("set");
        assert_eq!(store.get("components"), Some(json!([1, 2])));
    }

    #[test]
    fn memory_store_clones_share_data() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.set("k", &json!(true)).expect("set");
        assert_eq!(clone.get("k"), Some(json!(true)));
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).expect("store");
        store
            .set("canvasOptions", &json!({"scalable": false}))
            .expect("set");

        let path = dir.path().join("canvasOptions.json");
        assert!(path.exists());

        let reopened = FileStore::open(dir.path()).expect("reopen");
        assert_eq!(reopened.get("canvasOptions"), Some(json!({"scalable": false})));
    }

    #[test]
    fn file_store_missing_and_corrupt_are_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).expect("store");
        assert!(store.get("components").is_none());

        std::fs::write(dir.path().join("components.json"), "{ not json").expect("write");
        assert!(store.get("components").is_none());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("simple"), "simple");
        assert_eq!(sanitize_filename("with-dash"), "with-dash");
        assert_eq!(sanitize_filename("has/slash"), "has_slash");
        assert_eq!(sanitize_filename("a.b.c"), "a_b_c");
    }
}
