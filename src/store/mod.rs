//! Durable key/value storage for the timer state
//! 
//! The scheduler is the only writer. Displays read the same keys on their
//! own cadence and must treat them as eventually consistent snapshots.

pub mod file_store;
pub mod memory_store;

use std::collections::HashMap;

use futures::future::BoxFuture;
use serde_json::Value;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Key holding the current mode (`"work"` or `"break"`)
pub const MODE_KEY: &str = "mode";
/// Key holding the remaining countdown in milliseconds
pub const REMAINING_TIME_KEY: &str = "remainingTime";
/// Keys read when seeding the scheduler
pub const TIMER_KEYS: [&str; 2] = [MODE_KEY, REMAINING_TIME_KEY];

/// A set of stored entries
pub type StoreMap = HashMap<String, Value>;

/// Asynchronous key/value store that survives process restarts
pub trait StateStore: Send + Sync {
    /// Fetch the requested keys. Keys that were never written are absent.
    fn get<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, anyhow::Result<StoreMap>>;

    /// Upsert the given entries, leaving other keys untouched
    fn set(&self, entries: StoreMap) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Copy the requested keys out of a map
pub(crate) fn select(entries: &StoreMap, keys: &[&str]) -> StoreMap {
    keys.iter()
        .filter_map(|key| entries.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect()
}
