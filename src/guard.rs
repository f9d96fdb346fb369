//! Debug instrumentation for subscription churn.
//!
//! The common misuse this guards against is constructing and subscribing to
//! a fresh watched value on every render cycle, which defeats caching and
//! causes redundant store reads. The guard keeps the last few subscription
//! timestamps per key and raises a non-fatal warning when they arrive faster
//! than a sustained cadence would produce. Subscriptions proceed normally
//! whether or not they are flagged.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use tracing::warn;

/// Subscriptions tracked per key. The warning compares the newest timestamp
/// against the oldest in this window.
const WINDOW: usize = 4;

/// A full window arriving in less than this flags the key. Four
/// subscriptions spaced a sustained 250ms apart span exactly this duration
/// and stay unflagged.
const MIN_SPREAD: Duration = Duration::from_millis(750);

/// Time source for the guard, injectable so tests control elapsed time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Production clock reading the system monotonic time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Non-fatal diagnostic describing a flagged key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChurnWarning {
    /// The flagged key (`*` for the aggregate view).
    pub key: String,
    /// Elapsed time across the last [`WINDOW`] subscriptions.
    pub spread: Duration,
}

struct GuardInner {
    enabled: AtomicBool,
    clock: Arc<dyn Clock>,
    log: Mutex<HashMap<String, VecDeque<Instant>>>,
}

/// Detects pathological resubscription frequency per key.
///
/// Cheap to clone; clones share state. Enabled by default only in debug
/// builds and toggleable at runtime either way.
#[derive(Clone)]
pub struct RateGuard {
    inner: Arc<GuardInner>,
}

impl RateGuard {
    /// Creates a guard on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a guard on an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(GuardInner {
                enabled: AtomicBool::new(cfg!(debug_assertions)),
                clock,
                log: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Turns the guard on or off at runtime.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Release);
    }

    /// Whether the guard is currently recording.
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Records a subscription to `key` and flags it when the window fills
    /// too fast. The returned warning has already been logged.
    pub fn note_subscribe(&self, key: &str) -> Option<ChurnWarning> {
        if !self.is_enabled() {
            return None;
        }

        let now = self.inner.clock.now();
        let mut log = self.lock_log();
        let timestamps = log.entry(key.to_string()).or_default();

        timestamps.push_back(now);
        if timestamps.len() > WINDOW {
            timestamps.pop_front();
        }
        if timestamps.len() < WINDOW {
            return None;
        }

        let earliest = timestamps.front().copied()?;
        let spread = now.saturating_duration_since(earliest);
        if spread >= MIN_SPREAD {
            return None;
        }

        warn!(
            key,
            resubscriptions = WINDOW,
            spread_ms = spread.as_millis() as u64,
            "key is being resubscribed every render cycle; construct the watched value once and reuse it"
        );
        Some(ChurnWarning {
            key: key.to_string(),
            spread,
        })
    }

    /// Forgets all recorded timestamps.
    pub fn reset(&self) {
        self.lock_log().clear();
    }

    fn lock_log(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        match self.inner.log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for RateGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGuard")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
