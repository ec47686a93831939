use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::Duration,
};

use axum::async_trait;
use chrono::Utc;

use crate::error::AppResult;

use super::KvStore;

struct Entry {
    value: String,
    expires_at: i64,
}

/// In-process TTL-cleaned store, generalized from the teacher's `AuthSessionStore`. Backs the
/// metadata cache, rate-limit counters, and circuit-breaker state behind the `KvStore` trait.
/// Swapping in a networked store (e.g. Redis) for horizontal scale-out is a drop-in
/// implementation of the same trait (see DESIGN.md).
#[derive(Clone)]
pub struct InMemoryKvStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn clean_store(&self) {
        let now = Utc::now().timestamp();
        self.inner
            .write()
            .unwrap()
            .retain(|_, entry| entry.expires_at > now);
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Utc::now().timestamp();
        let guard = self.inner.read().unwrap();
        Ok(guard
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> AppResult<()> {
        let expires_at = Utc::now().timestamp() + ttl.as_secs() as i64;
        self.inner
            .write()
            .unwrap()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> AppResult<i64> {
        let now = Utc::now().timestamp();
        let mut guard = self.inner.write().unwrap();
        let next = match guard.get(key) {
            Some(entry) if entry.expires_at > now => {
                entry.value.parse::<i64>().unwrap_or(0) + 1
            }
            _ => 1,
        };
        guard.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: now + ttl.as_secs() as i64,
            },
        );
        Ok(next)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_none_for_missing_key() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryKvStore::new();
        store
            .set_with_ttl("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn expired_entry_is_not_returned() {
        let store = InMemoryKvStore::new();
        store
            .set_with_ttl("k", "v".to_string(), Duration::from_secs(0))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn incr_with_ttl_starts_at_one_and_accumulates() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.incr_with_ttl("c", Duration::from_secs(60)).await.unwrap(), 1);
        assert_eq!(store.incr_with_ttl("c", Duration::from_secs(60)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = InMemoryKvStore::new();
        store
            .set_with_ttl("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clean_store_evicts_expired_entries() {
        let store = InMemoryKvStore::new();
        store
            .set_with_ttl("k", "v".to_string(), Duration::from_secs(0))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        store.clean_store();
        assert_eq!(store.inner.read().unwrap().len(), 0);
    }
}
