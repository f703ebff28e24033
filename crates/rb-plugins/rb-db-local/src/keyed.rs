//! Typed JSON access to a `KeyValueStore` under fixed, namespaced keys.
//!
//! Storage failures never propagate: a corrupt or unreadable document reads
//! as absent, a failed write reports `false`. Both are logged.
//!
//! Collections are decoded record by record. A record that doesn't fit the
//! model is skipped on read and written back untouched, so one bad entry
//! never costs the rest of the collection.

use log::{error, warn};
use rb_core::traits::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Users,
    Posts,
    Replies,
    Likes,
    CurrentUser,
    Token,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::Users,
        StorageKey::Posts,
        StorageKey::Replies,
        StorageKey::Likes,
        StorageKey::CurrentUser,
        StorageKey::Token,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            StorageKey::Users => "runeterra_users",
            StorageKey::Posts => "runeterra_posts",
            StorageKey::Replies => "runeterra_replies",
            StorageKey::Likes => "runeterra_likes",
            StorageKey::CurrentUser => "runeterra_current_user",
            StorageKey::Token => "runeterra_token",
        }
    }
}

/// Raw state of a collection document.
enum Entries {
    List(Vec<Value>),
    /// Present but not a JSON array, or the backend failed.
    Unreadable,
}

#[derive(Clone)]
pub struct KeyedStore {
    backend: Arc<dyn KeyValueStore>,
}

impl KeyedStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn read<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.backend.get_item(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("reading {} failed: {e:#}", key.as_str());
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("reading {} failed: corrupt JSON: {e}", key.as_str());
                None
            }
        }
    }

    fn entries(&self, key: StorageKey) -> Entries {
        let raw = match self.backend.get_item(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Entries::List(Vec::new()),
            Err(e) => {
                error!("reading {} failed: {e:#}", key.as_str());
                return Entries::Unreadable;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(Value::Array(items)) => Entries::List(items),
            Ok(Value::Null) => Entries::List(Vec::new()),
            Ok(other) => {
                error!("reading {} failed: expected an array, found {other}", key.as_str());
                Entries::Unreadable
            }
            Err(e) => {
                error!("reading {} failed: corrupt JSON: {e}", key.as_str());
                Entries::Unreadable
            }
        }
    }

    /// A collection; absent or unreadable reads as empty. Records that don't
    /// decode as `T` are skipped.
    pub fn read_list<T: DeserializeOwned>(&self, key: StorageKey) -> Vec<T> {
        let Entries::List(items) = self.entries(key) else {
            return Vec::new();
        };
        items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping record {idx} of {}: {e}", key.as_str());
                    None
                }
            })
            .collect()
    }

    /// Replaces a collection with `items`. Stored records that don't decode
    /// as `T` are kept after them. A document that can't be read as an array
    /// is left alone and the write reports `false`.
    pub fn write_list<T: Serialize + DeserializeOwned>(&self, key: StorageKey, items: &[T]) -> bool {
        let undecodable: Vec<Value> = match self.entries(key) {
            Entries::List(existing) => existing
                .into_iter()
                .filter(|item| T::deserialize(item).is_err())
                .collect(),
            Entries::Unreadable => {
                error!("not overwriting unreadable {}", key.as_str());
                return false;
            }
        };

        let mut values = Vec::with_capacity(items.len() + undecodable.len());
        for item in items {
            match serde_json::to_value(item) {
                Ok(value) => values.push(value),
                Err(e) => {
                    error!("saving {} failed: {e}", key.as_str());
                    return false;
                }
            }
        }
        values.extend(undecodable);
        self.write(key, &values)
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                error!("saving {} failed: {e}", key.as_str());
                return false;
            }
        };
        match self.backend.set_item(key.as_str(), &raw) {
            Ok(()) => true,
            Err(e) => {
                error!("saving {} failed: {e:#}", key.as_str());
                false
            }
        }
    }

    pub fn remove(&self, key: StorageKey) -> bool {
        match self.backend.remove_item(key.as_str()) {
            Ok(()) => true,
            Err(e) => {
                error!("removing {} failed: {e:#}", key.as_str());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rb_core::traits::MockKeyValueStore;
    use rb_storage_local::MemoryStore;

    #[test]
    fn corrupt_json_reads_as_absent() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_item("runeterra_posts", "{not json").unwrap();
        let store = KeyedStore::new(backend);
        assert_eq!(store.read::<Vec<u32>>(StorageKey::Posts), None);
        assert!(store.read_list::<u32>(StorageKey::Posts).is_empty());
    }

    #[test]
    fn bad_records_are_skipped_but_kept() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_item("runeterra_likes", r#"[1, "two", 3]"#).unwrap();
        let store = KeyedStore::new(backend.clone());
        assert_eq!(store.read_list::<u32>(StorageKey::Likes), vec![1, 3]);

        assert!(store.write_list(StorageKey::Likes, &[1u32, 3, 4]));
        let raw = backend.get_item("runeterra_likes").unwrap().unwrap();
        assert_eq!(raw, r#"[1,3,4,"two"]"#);
    }

    #[test]
    fn unreadable_collection_is_not_overwritten() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_item("runeterra_posts", "{not json").unwrap();
        let store = KeyedStore::new(backend.clone());
        assert!(!store.write_list(StorageKey::Posts, &[1u32]));
        assert_eq!(backend.get_item("runeterra_posts").unwrap().as_deref(), Some("{not json"));

        store.remove(StorageKey::Posts);
        assert!(store.write_list(StorageKey::Posts, &[1u32]));
    }

    #[test]
    fn backend_failures_are_swallowed() {
        let mut backend = MockKeyValueStore::new();
        backend
            .expect_get_item()
            .returning(|_| Err(anyhow::anyhow!("disk on fire")));
        backend
            .expect_set_item()
            .returning(|_, _| Err(anyhow::anyhow!("quota exceeded")));
        let store = KeyedStore::new(Arc::new(backend));
        assert_eq!(store.read::<Vec<u32>>(StorageKey::Users), None);
        assert!(!store.write(StorageKey::Users, &vec![1u32]));
    }

    #[test]
    fn keys_are_namespaced() {
        for key in StorageKey::ALL {
            assert!(key.as_str().starts_with("runeterra_"));
        }
    }
}
