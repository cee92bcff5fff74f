//! Durable string-keyed slots.
//!
//! The bookmark set is mirrored into a single named slot, the same contract a
//! browser's `localStorage` offers: `get_item` / `set_item` over strings.
//!
//! - [`FileStore`]: one file per key under a data directory
//! - [`MemoryStore`]: process-local slots for tests and throwaway sessions

use crate::error::{NewsError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// A string key-value store with read-after-write consistency.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if the key was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Slots persisted as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file that is then renamed over the slot,
/// so a reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(NewsError::Storage(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid slot key {key:?}"),
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    #[instrument(level = "debug", skip(self), fields(dir = %self.dir.display()))]
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(bytes = contents.len(), "Read slot");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(level = "debug", skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        debug!(path = %path.display(), "Wrote slot");
        Ok(())
    }
}

/// In-memory slots. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_item("bookmarks").unwrap(), None);
        store.set_item("bookmarks", "[]").unwrap();
        assert_eq!(store.get_item("bookmarks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get_item("bookmarks").unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("loopnews");
        let mut store = FileStore::new(&nested);

        store.set_item("bookmarks", "[1]").unwrap();
        store.set_item("bookmarks", "[1,2]").unwrap();

        assert_eq!(store.get_item("bookmarks").unwrap().as_deref(), Some("[1,2]"));
        assert!(nested.join("bookmarks.json").exists());
        assert!(!nested.join(".bookmarks.json.tmp").exists());
    }

    #[test]
    fn test_file_store_visible_to_fresh_instance() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileStore::new(dir.path());
        writer.set_item("bookmarks", "[\"x\"]").unwrap();

        let reader = FileStore::new(dir.path());
        assert_eq!(reader.get_item("bookmarks").unwrap().as_deref(), Some("[\"x\"]"));
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        assert!(store.set_item("../escape", "x").is_err());
        assert!(store.get_item("").is_err());
    }
}
