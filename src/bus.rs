//! Broadcast bus of changed keys.
//!
//! One [`ChangeBus`] exists per store session. Writers publish the key they
//! changed after the underlying store write completes; every active
//! subscription observes every publication independently. The channel is
//! FIFO per receiver, so events for the same key reach a given subscriber in
//! publish order. Nothing is re-delivered to receivers created later:
//! consumers always re-read the store, which is the source of truth.

use std::{fmt, sync::Arc};

use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::debug;

/// Per-receiver buffer depth. A receiver that falls further behind than this
/// skips the missed notifications and re-reads current state.
const CHANGE_CAPACITY: usize = 1024;

/// Selects which changed keys a subscription observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelector {
    /// Events for exactly one key.
    Key(Arc<str>),
    /// The reserved aggregate sentinel: every event passes through.
    All,
}

impl KeySelector {
    /// Selector for a single key.
    pub fn key(name: impl Into<Arc<str>>) -> Self {
        Self::Key(name.into())
    }

    /// Whether an event for `changed` passes this selector.
    pub fn matches(&self, changed: &str) -> bool {
        match self {
            Self::Key(key) => **key == *changed,
            Self::All => true,
        }
    }

    /// The concrete key, or `None` for the aggregate sentinel.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::All => None,
        }
    }
}

impl fmt::Display for KeySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::All => f.write_str("*"),
        }
    }
}

/// Broadcast channel of changed-key notifications.
///
/// Cheap to clone; every clone publishes into and subscribes to the same
/// channel. Created once per store session and shared by all watched values
/// of that session.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<Arc<str>>,
}

impl ChangeBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CAPACITY);
        Self { tx }
    }

    /// Publishes a changed key to every current subscriber.
    ///
    /// Fire-and-forget: a bus with no subscribers is not an error.
    pub fn publish(&self, key: &str) {
        let _ = self.tx.send(Arc::from(key));
    }

    /// A raw receiver observing every publication from this point on.
    pub fn receiver(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    /// A stream of changed keys filtered through `selector`.
    ///
    /// A receiver that lags skips the missed notifications; the next store
    /// read is authoritative, so nothing stale can be observed through this.
    pub fn changes(&self, selector: KeySelector) -> impl Stream<Item = Arc<str>> + Send + use<> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(move |event| {
            let passes = match &event {
                Ok(key) => selector.matches(key),
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    debug!(missed, "change bus receiver lagged, skipping missed keys");
                    false
                }
            };
            futures::future::ready(match event {
                Ok(key) if passes => Some(key),
                _ => None,
            })
        })
    }

    /// Number of currently attached receivers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn single_key_selector_matches_only_its_key() {
        let selector = KeySelector::key("volume");

        assert!(selector.matches("volume"));
        assert!(!selector.matches("brightness"));
        assert_eq!(selector.as_key(), Some("volume"));
    }

    #[test]
    fn aggregate_selector_matches_everything() {
        assert!(KeySelector::All.matches("volume"));
        assert!(KeySelector::All.matches(""));
        assert_eq!(KeySelector::All.as_key(), None);
        assert_eq!(KeySelector::All.to_string(), "*");
    }

    #[tokio::test]
    async fn every_receiver_sees_a_publication() {
        let bus = ChangeBus::new();
        let mut first = bus.receiver();
        let mut second = bus.receiver();

        bus.publish("volume");

        assert_eq!(&*first.recv().await.unwrap(), "volume");
        assert_eq!(&*second.recv().await.unwrap(), "volume");
    }

    #[tokio::test]
    async fn filtered_stream_drops_other_keys() {
        let bus = ChangeBus::new();
        let mut changes = Box::pin(bus.changes(KeySelector::key("volume")));

        bus.publish("brightness");
        bus.publish("volume");

        assert_eq!(&*changes.next().await.unwrap(), "volume");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let bus = ChangeBus::new();
        bus.publish("volume");
        assert_eq!(bus.subscriber_count(), 0);
    }
}
