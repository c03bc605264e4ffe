//! The persistent key/value store.
//!
//! Every collection, the session and the theme are each kept as one independent JSON document
//! under a string key. Reading is forgiving: anything that is missing, literally `undefined`, or
//! does not parse into the expected schema comes back as the caller's fallback. Writing is not:
//! a failed write is returned to the caller.

use crate::{fs, Result};
use anyhow::{ensure, Context};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The key of the persisted session user.
pub const AUTH_KEY: &str = "hf_auth";
/// The key of the user list.
pub const USERS_KEY: &str = "hf_users";
/// The key of the project list.
pub const PROJECTS_KEY: &str = "hf_projects";
/// The key of the transaction list.
pub const TRANSACTIONS_KEY: &str = "hf_transactions";
/// The key of the theme preference.
pub const THEME_KEY: &str = "hf_theme";

/// A raw string-keyed, string-valued durable storage backend.
pub trait Storage: Debug {
    /// Returns the stored value for `key`, or `None` if nothing is stored.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing anything already there.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a key that does not exist succeeds.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// Keeps each key in its own `<key>.json` file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).context("Unable to create the storage directory")?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        ensure!(
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "Invalid storage key '{key}'"
        );
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        fs::read_optional(self.path(key)?)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        fs::write_atomic(self.path(key)?, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        fs::remove_file(self.path(key)?)
    }
}

/// An in-memory storage backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let _ = self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let _ = self.items.remove(key);
        Ok(())
    }
}

/// Typed JSON access on top of a [`Storage`] backend.
#[derive(Debug)]
pub struct Store {
    storage: Box<dyn Storage>,
}

impl Store {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Returns the value stored under `key`, or `fallback()` when the record is missing, is the
    /// string `undefined`, is blank, cannot be read, or does not parse as a `T`. Never fails.
    pub fn load<T, F>(&self, key: &str, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Nothing stored under '{key}', using the default");
                return fallback();
            }
            Err(e) => {
                warn!("Unable to read '{key}', using the default: {e:#}");
                return fallback();
            }
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "undefined" {
            debug!("Empty record stored under '{key}', using the default");
            return fallback();
        }
        match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(e) => {
                warn!("Malformed record stored under '{key}', using the default: {e}");
                fallback()
            }
        }
    }

    /// Serializes `value` as JSON and writes it under `key` immediately.
    pub fn save<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Unable to serialize the record for '{key}'"))?;
        self.storage
            .set_item(key, &json)
            .with_context(|| format!("Unable to save '{key}'"))?;
        debug!("Saved '{key}' ({} bytes)", json.len());
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .with_context(|| format!("Unable to remove '{key}'"))
    }

    /// Returns the raw stored text for `key`, if any.
    pub fn raw(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Thing {
        name: String,
        count: u32,
    }

    fn fallback() -> Vec<Thing> {
        vec![Thing {
            name: "fallback".to_string(),
            count: 0,
        }]
    }

    fn store_with(key: &str, raw: &str) -> Store {
        let mut storage = MemoryStorage::new();
        storage.set_item(key, raw).unwrap();
        Store::new(storage)
    }

    #[test]
    fn test_load_missing_uses_fallback() {
        let store = Store::new(MemoryStorage::new());
        assert_eq!(store.load("things", fallback), fallback());
    }

    #[test]
    fn test_load_undefined_uses_fallback() {
        let store = store_with("things", "undefined");
        assert_eq!(store.load("things", fallback), fallback());
    }

    #[test]
    fn test_load_blank_uses_fallback() {
        let store = store_with("things", "   ");
        assert_eq!(store.load("things", fallback), fallback());
    }

    #[test]
    fn test_load_malformed_uses_fallback() {
        for raw in ["{not json", "42", r#"[{"name": 7}]"#, r#"{"name":"a","count":1}"#] {
            let store = store_with("things", raw);
            assert_eq!(store.load("things", fallback), fallback(), "input {raw}");
        }
    }

    #[test]
    fn test_save_then_load() {
        let mut store = Store::new(MemoryStorage::new());
        let things = vec![Thing {
            name: "a".to_string(),
            count: 2,
        }];
        store.save("things", &things).unwrap();
        assert_eq!(
            store.raw("things").unwrap().as_deref(),
            Some(r#"[{"name":"a","count":2}]"#)
        );
        assert_eq!(store.load("things", fallback), things);
    }

    #[test]
    fn test_one_corrupt_key_does_not_affect_another() {
        let mut store = Store::new(MemoryStorage::new());
        store.save("good", &vec![1, 2, 3]).unwrap();
        store.storage.set_item("bad", "[1, 2,").unwrap();
        assert_eq!(store.load("good", Vec::<i32>::new), vec![1, 2, 3]);
        assert_eq!(store.load("bad", Vec::<i32>::new), Vec::<i32>::new());
    }

    #[test]
    fn test_remove() {
        let mut store = store_with("things", "[]");
        store.remove("things").unwrap();
        assert!(store.raw("things").unwrap().is_none());
        store.remove("things").unwrap();
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().join("storage")).unwrap();
        assert!(storage.get_item(PROJECTS_KEY).unwrap().is_none());
        storage.set_item(PROJECTS_KEY, "[]").unwrap();
        assert!(storage.dir().join("hf_projects.json").is_file());
        assert_eq!(storage.get_item(PROJECTS_KEY).unwrap().as_deref(), Some("[]"));
        storage.remove_item(PROJECTS_KEY).unwrap();
        assert!(storage.get_item(PROJECTS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path()).unwrap();
        assert!(storage.set_item("../escape", "x").is_err());
        assert!(storage.get_item("").is_err());
    }
}
