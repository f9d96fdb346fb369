//! Process-wide shared session.
//!
//! One change bus must exist per logical store, shared by all callers. The
//! session slot memoizes a lazily initialized [`Preferences`]; concurrent
//! first callers serialize on a single in-flight initialization, so the
//! initializer runs at most once per session lifetime.

use std::{future::Future, sync::Arc};

use tokio::sync::Mutex;
use tracing::debug;

use crate::store::Store;

use super::Preferences;

static SESSION: Mutex<Option<Preferences>> = Mutex::const_new(None);

/// The shared session, initializing it on first call.
///
/// `init` resolves the backing store; it is only awaited when the slot is
/// empty. Later callers (and concurrent first callers that lost the race)
/// get the memoized session and never run their initializer.
pub async fn session<F, Fut>(init: F) -> Preferences
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Arc<dyn Store>>,
{
    let mut slot = SESSION.lock().await;
    if let Some(prefs) = slot.as_ref() {
        return prefs.clone();
    }

    debug!("initializing shared preferences session");
    let prefs = Preferences::new(init().await);
    *slot = Some(prefs.clone());
    prefs
}

/// Drops the shared session so the next [`session`] call reinitializes.
///
/// Explicit test-teardown hook; nothing resets the session implicitly.
/// Existing clones keep their (now detached) bus and store.
pub async fn reset_session() {
    SESSION.lock().await.take();
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crate::store::MemoryStore;

    use super::*;

    fn memory_store() -> Arc<dyn Store> {
        Arc::new(MemoryStore::new())
    }

    // One test drives the whole lifecycle: the slot is process-global, so
    // separate tests would race each other.
    #[tokio::test]
    async fn memoizes_until_explicitly_reset() {
        reset_session().await;

        let first = session(|| async { memory_store() }).await;
        assert!(first.bool("seen", false).set(true).await.unwrap());

        let second = session(|| async {
            // A memoized session never reruns its initializer.
            unreachable!("initializer ran twice")
        })
        .await;
        assert!(second.bool("seen", false).value());

        reset_session().await;
        let third = session(|| async { memory_store() }).await;
        assert!(!third.bool("seen", false).value());
    }
}
