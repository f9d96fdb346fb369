//! Store façade, typed constructors, and the shared session.
//!
//! A [`Preferences`] owns the pieces every watched value of a session
//! shares: the backing store handle, the change bus, and the rate guard.
//! It is cheap to clone; all clones publish into and observe the same bus.

mod session;

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    adapter::{
        Adapter, BoolAdapter, DateTimeAdapter, FloatAdapter, IntAdapter, JsonAdapter, KeysAdapter,
        StringAdapter, StringListAdapter,
    },
    bus::{ChangeBus, KeySelector},
    guard::RateGuard,
    store::{MemoryStore, Store},
    value::WatchedValue,
};

pub use session::{reset_session, session};

/// Per-session façade over a backing store.
///
/// Constructs watched values bound to this session's change bus. Watched
/// values built from different clones of the same `Preferences` observe
/// each other's writes.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn Store>,
    bus: ChangeBus,
    guard: RateGuard,
}

impl Preferences {
    /// Creates a session over `store` with a fresh change bus.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_guard(store, RateGuard::new())
    }

    /// Creates a session with an injected rate guard (deterministic clocks
    /// in tests).
    pub fn with_guard(store: Arc<dyn Store>, guard: RateGuard) -> Self {
        Self {
            store,
            bus: ChangeBus::new(),
            guard,
        }
    }

    /// Creates a session over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The session's change bus.
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// The session's rate guard, for toggling at runtime.
    pub fn rate_guard(&self) -> &RateGuard {
        &self.guard
    }

    /// A watched boolean value under `key`.
    pub fn bool(&self, key: &str, default: bool) -> WatchedValue<bool> {
        self.keyed(key, default, Arc::new(BoolAdapter))
    }

    /// A watched integer value under `key`.
    pub fn int(&self, key: &str, default: i64) -> WatchedValue<i64> {
        self.keyed(key, default, Arc::new(IntAdapter))
    }

    /// A watched floating-point value under `key`.
    pub fn float(&self, key: &str, default: f64) -> WatchedValue<f64> {
        self.keyed(key, default, Arc::new(FloatAdapter))
    }

    /// A watched string value under `key`.
    pub fn string(&self, key: &str, default: impl Into<String>) -> WatchedValue<String> {
        self.keyed(key, default.into(), Arc::new(StringAdapter))
    }

    /// A watched string-list value under `key`.
    pub fn string_list(&self, key: &str, default: Vec<String>) -> WatchedValue<Vec<String>> {
        self.keyed(key, default, Arc::new(StringListAdapter))
    }

    /// A watched serde-serializable value under `key`, stored as JSON text.
    pub fn json<T>(&self, key: &str, default: T) -> WatchedValue<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.keyed(key, default, Arc::new(JsonAdapter::new()))
    }

    /// A watched UTC timestamp under `key`, stored as epoch milliseconds.
    pub fn date_time(&self, key: &str, default: DateTime<Utc>) -> WatchedValue<DateTime<Utc>> {
        self.keyed(key, default, Arc::new(DateTimeAdapter))
    }

    /// A watched value under `key` through a caller-supplied adapter.
    pub fn custom<T>(&self, key: &str, default: T, adapter: Arc<dyn Adapter<T>>) -> WatchedValue<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.keyed(key, default, adapter)
    }

    /// The aggregate key-listing view.
    ///
    /// Observes every mutation to any key and re-reads the full key set, so
    /// it is eventually consistent with at most one event's latency. An
    /// empty store reads as the explicit empty set. Mutation through this
    /// handle is a precondition error.
    pub fn keys(&self) -> WatchedValue<BTreeSet<String>> {
        WatchedValue::new(
            self.store.clone(),
            self.bus.clone(),
            KeySelector::All,
            BTreeSet::new(),
            Arc::new(KeysAdapter),
            self.guard.clone(),
        )
    }

    /// Clears the whole store.
    ///
    /// On success, publishes a change for every previously existing key so
    /// keyed subscribers fall back to their defaults and aggregate
    /// subscribers observe the empty set.
    pub async fn clear_all(&self) -> bool {
        let existing = self.store.keys();
        let cleared = self.store.clear().await;
        if cleared {
            for key in existing {
                self.bus.publish(&key);
            }
        }
        cleared
    }

    fn keyed<T>(&self, key: &str, default: T, adapter: Arc<dyn Adapter<T>>) -> WatchedValue<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        WatchedValue::new(
            self.store.clone(),
            self.bus.clone(),
            KeySelector::key(key),
            default,
            adapter,
            self.guard.clone(),
        )
    }
}
