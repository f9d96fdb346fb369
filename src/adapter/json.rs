use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::store::Store;

use super::{Adapter, PrimitiveKind};

/// Adapter storing any serde-serializable value as a JSON string.
///
/// Stored text that fails to decode as `T` reads as absent, so the watched
/// value falls back to its default instead of failing the read path.
#[derive(Debug)]
pub struct JsonAdapter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonAdapter<T> {
    /// Creates a JSON adapter for `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonAdapter<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Adapter<T> for JsonAdapter<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Str
    }

    fn read(&self, store: &dyn Store, key: &str) -> Option<T> {
        let raw = store.get_string(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(key, %err, "stored JSON failed to decode, treating as absent");
                None
            }
        }
    }

    async fn write(&self, store: &dyn Store, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => store.set_string(key, &raw).await,
            Err(err) => {
                debug!(key, %err, "value failed to serialize as JSON");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use serde::Deserialize;

    use crate::store::MemoryStore;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Theme {
        name: String,
        font_size: u32,
    }

    #[tokio::test]
    async fn round_trips_through_the_string_representation() {
        let store = Arc::new(MemoryStore::new());
        let adapter = JsonAdapter::<Theme>::new();
        let theme = Theme {
            name: "dark".to_string(),
            font_size: 14,
        };

        assert!(adapter.write(store.as_ref(), "theme", &theme).await);
        assert_eq!(adapter.read(store.as_ref(), "theme"), Some(theme));
    }

    #[tokio::test]
    async fn undecodable_text_reads_as_absent() {
        let store = Arc::new(MemoryStore::new());
        assert!(store.set_string("theme", "not json at all").await);

        let adapter = JsonAdapter::<Theme>::new();
        assert_eq!(adapter.read(store.as_ref(), "theme"), None);
    }
}
