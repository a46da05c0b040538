//! Process-local store

use std::sync::Mutex;

use futures::future::{self, BoxFuture, FutureExt};

use super::{select, StateStore, StoreMap};

/// Store that lives only as long as the process, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<StoreMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds some entries
    pub fn with_entries(entries: StoreMap) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Copy of everything stored so far
    pub fn snapshot(&self) -> StoreMap {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl StateStore for MemoryStore {
    fn get<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, anyhow::Result<StoreMap>> {
        let result = self
            .entries
            .lock()
            .map(|entries| select(&entries, keys))
            .map_err(|e| anyhow::anyhow!("Failed to lock memory store: {}", e));
        future::ready(result).boxed()
    }

    fn set(&self, entries: StoreMap) -> BoxFuture<'_, anyhow::Result<()>> {
        let result = self
            .entries
            .lock()
            .map(|mut stored| stored.extend(entries))
            .map_err(|e| anyhow::anyhow!("Failed to lock memory store: {}", e));
        future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::{MODE_KEY, REMAINING_TIME_KEY, TIMER_KEYS};

    #[tokio::test]
    async fn missing_keys_are_absent() {
        let store = MemoryStore::new();
        let found = store.get(&TIMER_KEYS).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn set_merges_without_dropping_other_keys() {
        let store = MemoryStore::new();
        store
            .set(StoreMap::from([
                (MODE_KEY.to_string(), json!("break")),
                (REMAINING_TIME_KEY.to_string(), json!(300_000)),
            ]))
            .await
            .unwrap();
        store
            .set(StoreMap::from([(REMAINING_TIME_KEY.to_string(), json!(299_000))]))
            .await
            .unwrap();

        let found = store.get(&TIMER_KEYS).await.unwrap();
        assert_eq!(found[MODE_KEY], json!("break"));
        assert_eq!(found[REMAINING_TIME_KEY], json!(299_000));
    }

    #[tokio::test]
    async fn get_returns_only_requested_keys() {
        let store = MemoryStore::with_entries(StoreMap::from([
            (MODE_KEY.to_string(), json!("work")),
            ("time".to_string(), json!(5)),
        ]));
        let found = store.get(&[MODE_KEY]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[MODE_KEY], json!("work"));
    }
}
