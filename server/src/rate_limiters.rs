use std::{sync::Arc, time::Duration};

use crate::{error::AppResult, kv::KvStore, server_config::cfg};

/// Window over which the shared YouTube counter is enforced (SPEC_FULL §6
/// `youtube.requestsPerSecond`).
const WINDOW: Duration = Duration::from_secs(1);
const YOUTUBE_RATE_LIMIT_KEY: &str = "rate_limit:youtube:global";

/// Store-backed rate limiter for the YouTube Data API. Counters live in the shared `KvStore`
/// rather than worker memory so every enrichment worker (and every process) sees the same
/// quota usage, per SPEC_FULL §5's shared-resource policy and §6's `rate_limit:{api}:{user}`
/// key layout. The YouTube quota is shared across all users rather than scoped per end user,
/// so the key here uses a fixed `global` scope.
#[derive(Clone)]
pub struct RateLimiters {
    kv: Arc<dyn KvStore>,
}

impl RateLimiters {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Blocks until a slot opens under `youtube.requestsPerSecond`, polling the shared counter
    /// rather than a per-process token bucket.
    pub async fn acquire_one(&self) -> AppResult<()> {
        loop {
            let count = self.kv.incr_with_ttl(YOUTUBE_RATE_LIMIT_KEY, WINDOW).await?;
            if count <= cfg.youtube.requests_per_second as i64 {
                return Ok(());
            }
            tokio::time::sleep(WINDOW).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKvStore;

    #[tokio::test]
    async fn admits_requests_up_to_the_configured_limit() {
        let limiters = RateLimiters::new(Arc::new(InMemoryKvStore::new()));
        for _ in 0..cfg.youtube.requests_per_second {
            limiters.acquire_one().await.unwrap();
        }
    }

    #[tokio::test]
    async fn shares_the_counter_across_clones() {
        let kv = Arc::new(InMemoryKvStore::new());
        let a = RateLimiters::new(kv.clone());
        let b = RateLimiters::new(kv.clone());

        a.acquire_one().await.unwrap();
        b.acquire_one().await.unwrap();

        let count = kv.incr_with_ttl(YOUTUBE_RATE_LIMIT_KEY, WINDOW).await.unwrap();
        assert_eq!(count, 3);
    }
}
