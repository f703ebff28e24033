//! # rb-storage-local
//!
//! Local implementations of `KeyValueStore`.
//! `MemoryStore` lives and dies with the process; `FileStore` keeps one JSON
//! document per key under a root directory.

use anyhow::Context;
use dashmap::DashMap;
use rb_core::traits::KeyValueStore;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// In-process store; each instance is its own storage scope.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

pub struct FileStore {
    /// Root directory for all documents (e.g., "./data/board")
    root_path: PathBuf,
}

impl FileStore {
    /// Creates the root directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root_path = root.into();
        fs::create_dir_all(&root_path)
            .with_context(|| format!("creating store directory {}", root_path.display()))?;
        Ok(Self { root_path })
    }

    /// Keys are fixed identifiers; anything outside `[A-Za-z0-9_-]` is
    /// replaced so a key can never escape the root.
    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root_path.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {key}")),
        }
    }

    /// Writes to a sibling temp file first, then renames over the target.
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("writing {key}"))?;
        fs::rename(&tmp, &target).with_context(|| format!("replacing {key}"))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {key}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("rb-storage-local-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").unwrap(), None);
        store.set_item("k", "[1,2]").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("[1,2]"));
        store.remove_item("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = scratch_dir();
        {
            let store = FileStore::open(&dir).unwrap();
            store.set_item("runeterra_posts", "[]").unwrap();
        }
        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.get_item("runeterra_posts").unwrap().as_deref(), Some("[]"));
        reopened.remove_item("runeterra_posts").unwrap();
        reopened.remove_item("runeterra_posts").unwrap();
        assert_eq!(reopened.get_item("runeterra_posts").unwrap(), None);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = scratch_dir();
        let store = FileStore::open(&dir).unwrap();
        store.set_item("../escape", "x").unwrap();
        assert!(dir.join("___escape.json").exists());
        fs::remove_dir_all(dir).ok();
    }
}
