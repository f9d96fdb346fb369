//! Prefwatch - change notifications over typed key-value storage.
//!
//! Prefwatch layers reactive change-notification semantics on top of a
//! synchronous, typed key-value store, so callers observe value changes
//! instead of polling while still reading the current value synchronously
//! at any time. The main pieces include:
//!
//! - A per-session broadcast bus of changed keys
//! - Watched values that replay the current value, then follow changes
//! - Opt-in per-subscription deduplication
//! - Combine-latest aggregation over values of different types
//! - Debug instrumentation flagging pathological resubscription
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use prefwatch::prefs::Preferences;
//!
//! # async fn example() {
//! let prefs = Preferences::in_memory();
//! let volume = prefs.int("volume", 50);
//!
//! // Synchronous read: the default until something is stored.
//! assert_eq!(volume.value(), 50);
//!
//! // Replay the current value, then follow changes.
//! let mut updates = volume.subscribe();
//! assert_eq!(updates.next().await, Some(50));
//!
//! volume.set(80).await.unwrap();
//! assert_eq!(updates.next().await, Some(80));
//! # }
//! ```

/// Typed adapters between stored primitives and Rust values.
pub mod adapter;

/// Broadcast bus of changed keys.
pub mod bus;

/// Combine-latest aggregation over watched values.
pub mod combine;

/// Core error types and result aliases.
pub mod core;

/// Debug instrumentation for subscription churn.
pub mod guard;

/// Store façade, typed constructors, and the shared session.
pub mod prefs;

/// Backing store contract and the in-memory reference store.
pub mod store;

/// The watched value primitive and its subscription pipeline.
pub mod value;

/// Re-exported core types for convenience.
pub use crate::core::{PrefwatchError, Result};
