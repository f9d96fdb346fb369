use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;

use super::Store;

/// One stored entry in its primitive representation.
#[derive(Debug, Clone, PartialEq)]
enum StoredValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
}

/// In-process store backed by a shared hash map.
///
/// Clones share the same underlying entries. Every operation succeeds, so
/// writes always report `true`; the type exists as the reference store for
/// tests and as the default backing of an in-memory session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredValue>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, StoredValue>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, StoredValue>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn insert(&self, key: &str, value: StoredValue) -> bool {
        self.write_entries().insert(key.to_string(), value);
        true
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn keys(&self) -> BTreeSet<String> {
        self.read_entries().keys().cloned().collect()
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.read_entries().get(key) {
            Some(StoredValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        match self.read_entries().get(key) {
            Some(StoredValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    fn get_float(&self, key: &str) -> Option<f64> {
        match self.read_entries().get(key) {
            Some(StoredValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.read_entries().get(key) {
            Some(StoredValue::Str(value)) => Some(value.clone()),
            _ => None,
        }
    }

    fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        match self.read_entries().get(key) {
            Some(StoredValue::StrList(value)) => Some(value.clone()),
            _ => None,
        }
    }

    async fn set_bool(&self, key: &str, value: bool) -> bool {
        self.insert(key, StoredValue::Bool(value))
    }

    async fn set_int(&self, key: &str, value: i64) -> bool {
        self.insert(key, StoredValue::Int(value))
    }

    async fn set_float(&self, key: &str, value: f64) -> bool {
        self.insert(key, StoredValue::Float(value))
    }

    async fn set_string(&self, key: &str, value: &str) -> bool {
        self.insert(key, StoredValue::Str(value.to_string()))
    }

    async fn set_string_list(&self, key: &str, value: &[String]) -> bool {
        self.insert(key, StoredValue::StrList(value.to_vec()))
    }

    async fn remove(&self, key: &str) -> bool {
        self.write_entries().remove(key).is_some()
    }

    async fn clear(&self) -> bool {
        self.write_entries().clear();
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn absent_keys_read_as_none() {
        let store = MemoryStore::new();

        assert_eq!(store.get_bool("missing"), None);
        assert_eq!(store.get_string("missing"), None);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn wrong_typed_reads_are_absent() {
        let store = MemoryStore::new();
        assert!(store.set_int("count", 3).await);

        assert_eq!(store.get_int("count"), Some(3));
        assert_eq!(store.get_bool("count"), None);
        assert_eq!(store.get_string("count"), None);
    }

    #[tokio::test]
    async fn remove_reports_whether_a_value_existed() {
        let store = MemoryStore::new();
        assert!(store.set_string("name", "a").await);

        assert!(store.remove("name").await);
        assert!(!store.remove("name").await);
    }

    #[tokio::test]
    async fn clear_empties_the_key_set() {
        let store = MemoryStore::new();
        assert!(store.set_bool("a", true).await);
        assert!(store.set_string_list("b", &["x".to_string()]).await);

        assert_eq!(store.keys().len(), 2);
        assert!(store.clear().await);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = MemoryStore::new();
        let alias = store.clone();
        assert!(store.set_float("ratio", 0.5).await);

        assert_eq!(alias.get_float("ratio"), Some(0.5));
    }
}
