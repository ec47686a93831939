mod in_memory;

pub use in_memory::InMemoryKvStore;

use std::time::Duration;

use axum::async_trait;

use crate::error::AppResult;

/// Shared ephemeral state: the metadata cache, rate-limit counters, and circuit-breaker state
/// all live behind this trait so every enrichment worker sees the same view regardless of which
/// process it runs in (SPEC_FULL §4.8, §5 shared-resource policy).
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> AppResult<()>;
    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> AppResult<i64>;
    async fn delete(&self, key: &str) -> AppResult<()>;
}
