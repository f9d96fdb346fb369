//! Backing store contract and the in-memory reference store.
//!
//! A [`Store`] is the synchronous, typed key-value collaborator that the
//! reactive layer sits on top of. Reads are synchronous and total: a missing
//! key (or a value stored under a different primitive type) is the explicit
//! absent state, never a panic. Writes are asynchronous and report a plain
//! boolean outcome; retry policy belongs to the store itself.

mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;

pub use memory::MemoryStore;

/// Synchronous, typed key-value storage.
///
/// Implementations must be thread-safe; the same store handle is shared by
/// every watched value of a session.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the set of all currently existing keys, possibly empty.
    fn keys(&self) -> BTreeSet<String>;

    /// Reads a boolean value. `None` means no value is stored under `key`.
    fn get_bool(&self, key: &str) -> Option<bool>;

    /// Reads an integer value. `None` means no value is stored under `key`.
    fn get_int(&self, key: &str) -> Option<i64>;

    /// Reads a floating-point value. `None` means no value is stored under `key`.
    fn get_float(&self, key: &str) -> Option<f64>;

    /// Reads a string value. `None` means no value is stored under `key`.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Reads a string-list value. `None` means no value is stored under `key`.
    fn get_string_list(&self, key: &str) -> Option<Vec<String>>;

    /// Writes a boolean value. Returns `false` on store-level failure.
    async fn set_bool(&self, key: &str, value: bool) -> bool;

    /// Writes an integer value. Returns `false` on store-level failure.
    async fn set_int(&self, key: &str, value: i64) -> bool;

    /// Writes a floating-point value. Returns `false` on store-level failure.
    async fn set_float(&self, key: &str, value: f64) -> bool;

    /// Writes a string value. Returns `false` on store-level failure.
    async fn set_string(&self, key: &str, value: &str) -> bool;

    /// Writes a string-list value. Returns `false` on store-level failure.
    async fn set_string_list(&self, key: &str, value: &[String]) -> bool;

    /// Removes the value stored under `key`, if any.
    async fn remove(&self, key: &str) -> bool;

    /// Removes every stored value.
    async fn clear(&self) -> bool;
}
