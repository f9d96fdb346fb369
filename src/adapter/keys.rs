use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::store::Store;

use super::{Adapter, PrimitiveKind};

/// Adapter behind the aggregate key-listing view.
///
/// Reads the full set of currently existing keys, ignoring the key argument.
/// The read is never absent: an empty store yields the explicit empty set.
/// The aggregate selector rejects mutations before adapter dispatch, so the
/// write path is unreachable through a watched value; a direct call answers
/// `false` without touching the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeysAdapter;

#[async_trait]
impl Adapter<BTreeSet<String>> for KeysAdapter {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::StrList
    }

    fn read(&self, store: &dyn Store, _key: &str) -> Option<BTreeSet<String>> {
        Some(store.keys())
    }

    async fn write(&self, _store: &dyn Store, _key: &str, _value: &BTreeSet<String>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use crate::store::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn empty_store_reads_as_the_explicit_empty_set() {
        let store = Arc::new(MemoryStore::new());

        let keys = KeysAdapter.read(store.as_ref(), "").unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn lists_every_existing_key() {
        let store = Arc::new(MemoryStore::new());
        assert!(store.set_bool("x", true).await);
        assert!(store.set_int("y", 1).await);

        let keys = KeysAdapter.read(store.as_ref(), "").unwrap();
        assert_eq!(keys, BTreeSet::from(["x".to_string(), "y".to_string()]));
    }

    #[tokio::test]
    async fn direct_writes_are_refused() {
        let store = Arc::new(MemoryStore::new());

        let refused = KeysAdapter
            .write(store.as_ref(), "", &BTreeSet::new())
            .await;
        assert!(!refused);
        assert!(store.keys().is_empty());
    }
}
