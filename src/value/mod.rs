//! The watched value primitive and its subscription pipeline.
//!
//! A [`WatchedValue`] binds one key (or the aggregate sentinel) to a typed
//! adapter, a default, and the session's change bus. It exposes the key's
//! current value as a synchronous read, a replay-then-follow stream, and a
//! write/clear entry point. Instances are cheap and stateless until
//! subscribed; equality is value equality over the key and value type so a
//! consumer can detect accidental re-creation of the same logical handle.

mod distinct;
pub(crate) mod subscription;

use std::{fmt, sync::Arc};

use async_stream::stream;
use futures::{StreamExt, stream::BoxStream};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::{
    PrefwatchError, Result,
    adapter::Adapter,
    bus::{ChangeBus, KeySelector},
    guard::RateGuard,
    store::Store,
};

pub use distinct::Distinct;
pub use subscription::{Subscription, SubscriptionControl};

/// Reactive read/write handle bound to one key.
///
/// Constructed through the session façade; many handles for the same key may
/// coexist and all observe the same store through the same bus.
pub struct WatchedValue<T: Clone + Send + Sync + 'static> {
    store: Arc<dyn Store>,
    bus: ChangeBus,
    selector: KeySelector,
    default: T,
    adapter: Arc<dyn Adapter<T>>,
    guard: RateGuard,
}

impl<T: Clone + Send + Sync + 'static> WatchedValue<T> {
    pub(crate) fn new(
        store: Arc<dyn Store>,
        bus: ChangeBus,
        selector: KeySelector,
        default: T,
        adapter: Arc<dyn Adapter<T>>,
        guard: RateGuard,
    ) -> Self {
        Self {
            store,
            bus,
            selector,
            default,
            adapter,
            guard,
        }
    }

    /// The key this handle observes, or `None` for the aggregate view.
    pub fn key(&self) -> Option<&str> {
        self.selector.as_key()
    }

    /// The value substituted while no value is stored.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Synchronous, side-effect-free read of the current value.
    ///
    /// Returns the adapted stored value, or the default when absent. Never
    /// touches the change bus.
    pub fn value(&self) -> T {
        let key = self.selector.as_key().unwrap_or("");
        self.adapter
            .read(self.store.as_ref(), key)
            .unwrap_or_else(|| self.default.clone())
    }

    /// Subscribes to this value.
    ///
    /// The returned stream yields the subscribe-time value first, then the
    /// re-read current value for every matching change-bus event (every
    /// event, for the aggregate view). Each call owns an independent
    /// pipeline: subscribers never share delivery state.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription::new(self.follow_stream())
    }

    /// Subscribes through the dedup transform.
    ///
    /// Consecutive structurally equal values collapse into one emission.
    /// Dedup state belongs to the returned subscription alone.
    pub fn subscribe_distinct(&self) -> Subscription<T>
    where
        T: PartialEq,
    {
        Subscription::new(Distinct::new(self.follow_stream()).boxed())
    }

    /// Writes a new value through the adapter and publishes the change.
    ///
    /// The key is published on the bus exactly once iff the underlying write
    /// reports success. Store-level failures are the `Ok(false)` outcome.
    ///
    /// # Errors
    /// [`PrefwatchError::AggregateMutation`] when this handle is the
    /// aggregate view; nothing is written and no event is published.
    pub async fn set(&self, value: T) -> Result<bool> {
        let key = self.mutable_key("set")?;
        let written = self.adapter.write(self.store.as_ref(), &key, &value).await;
        if written {
            self.bus.publish(&key);
        }
        Ok(written)
    }

    /// Removes the stored value and publishes the change.
    ///
    /// Subscribers re-read after the event and observe the default. The key
    /// is published iff the removal reports success.
    ///
    /// # Errors
    /// [`PrefwatchError::AggregateMutation`] when this handle is the
    /// aggregate view; nothing is removed and no event is published.
    pub async fn clear(&self) -> Result<bool> {
        let key = self.mutable_key("clear")?;
        let removed = self.store.remove(&key).await;
        if removed {
            self.bus.publish(&key);
        }
        Ok(removed)
    }

    fn mutable_key(&self, operation: &'static str) -> Result<Arc<str>> {
        match &self.selector {
            KeySelector::Key(key) => Ok(key.clone()),
            KeySelector::All => Err(PrefwatchError::AggregateMutation { operation }),
        }
    }

    /// The replay-then-follow pipeline shared by both subscribe flavors.
    ///
    /// The bus receiver is taken before the first read so no event published
    /// between subscribing and the first poll can be missed.
    fn follow_stream(&self) -> BoxStream<'static, T> {
        self.guard.note_subscribe(&self.selector.to_string());

        let mut events = self.bus.receiver();
        let first = self.value();
        let this = self.clone();

        stream! {
            yield first;
            loop {
                match events.recv().await {
                    Ok(key) => {
                        if this.selector.matches(&key) {
                            yield this.value();
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // Missed notifications may include this key; the
                        // store is the source of truth, so one re-read
                        // resynchronizes.
                        debug!(
                            selector = %this.selector,
                            missed,
                            "subscription lagged behind the change bus"
                        );
                        yield this.value();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
        .boxed()
    }
}

impl<T: Clone + Send + Sync + 'static> Clone for WatchedValue<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            bus: self.bus.clone(),
            selector: self.selector.clone(),
            default: self.default.clone(),
            adapter: self.adapter.clone(),
            guard: self.guard.clone(),
        }
    }
}

/// Value equality over the key and the adapter's representation.
///
/// Two separately constructed handles for the same key and value type
/// compare equal; instance identity never matters. The value type itself is
/// fixed by the type system, so only representation can still differ here.
impl<T: Clone + Send + Sync + 'static> PartialEq for WatchedValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.selector == other.selector && self.adapter.kind() == other.adapter.kind()
    }
}

impl<T: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for WatchedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchedValue")
            .field("key", &self.selector.to_string())
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crate::{
        adapter::{IntAdapter, JsonAdapter, StringAdapter},
        store::MemoryStore,
    };

    use super::*;

    fn handle<T, A>(selector: KeySelector, default: T, adapter: A) -> WatchedValue<T>
    where
        T: Clone + Send + Sync + 'static,
        A: Adapter<T> + 'static,
    {
        WatchedValue::new(
            Arc::new(MemoryStore::new()),
            ChangeBus::new(),
            selector,
            default,
            Arc::new(adapter),
            RateGuard::new(),
        )
    }

    #[test]
    fn handles_for_the_same_key_and_type_are_equal() {
        let first = handle(KeySelector::key("count"), 0, IntAdapter);
        let second = handle(KeySelector::key("count"), 42, IntAdapter);

        assert_eq!(first, second);
    }

    #[test]
    fn handles_for_different_keys_are_unequal() {
        let first = handle(KeySelector::key("count"), 0, IntAdapter);
        let second = handle(KeySelector::key("total"), 0, IntAdapter);

        assert_ne!(first, second);
    }

    #[test]
    fn representation_distinguishes_adapters_for_the_same_type() {
        let plain = handle(KeySelector::key("name"), String::new(), StringAdapter);
        let json = handle(
            KeySelector::key("name"),
            String::new(),
            JsonAdapter::<String>::new(),
        );

        // Both store strings, so representations collide and the handles
        // compare equal; an int-backed adapter for the same key would not.
        assert_eq!(plain, json);

        let aggregate = handle(KeySelector::All, String::new(), StringAdapter);
        assert_ne!(plain, aggregate);
    }
}
