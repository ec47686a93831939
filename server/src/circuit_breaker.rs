use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{error::AppError, kv::KvStore, server_config::cfg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Circuit breaker in front of the enrichment client, state held in the shared `KvStore` so it
/// is correct across concurrent workers rather than per-process (SPEC_FULL §4.3, §4.8).
pub struct CircuitBreaker {
    kv: Arc<dyn KvStore>,
    api: &'static str,
}

impl CircuitBreaker {
    pub fn new(kv: Arc<dyn KvStore>, api: &'static str) -> Self {
        Self { kv, api }
    }

    fn failures_key(&self) -> String {
        format!("circuit_breaker:{}:failures", self.api)
    }

    fn last_failure_key(&self) -> String {
        format!("circuit_breaker:{}:last_failure", self.api)
    }

    fn state_key(&self) -> String {
        format!("circuit_breaker:{}:state", self.api)
    }

    /// Returns the effective state, performing the `Open -> HalfOpen` transition in place when
    /// the reset timeout has elapsed.
    pub async fn state(&self) -> Result<BreakerState, AppError> {
        let raw = self.kv.get(&self.state_key()).await?;
        let state = match raw.as_deref() {
            Some("open") => BreakerState::Open,
            Some("half_open") => BreakerState::HalfOpen,
            _ => BreakerState::Closed,
        };

        if state != BreakerState::Open {
            return Ok(state);
        }

        let last_failure: i64 = self
            .kv
            .get(&self.last_failure_key())
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let elapsed_ms = (Utc::now().timestamp_millis() - last_failure).max(0);

        if elapsed_ms as u64 >= cfg.circuit_breaker.reset_timeout_ms {
            self.kv
                .set_with_ttl(
                    &self.state_key(),
                    "half_open".to_string(),
                    Duration::from_secs(3600),
                )
                .await?;
            return Ok(BreakerState::HalfOpen);
        }

        Ok(BreakerState::Open)
    }

    /// Call before issuing an upstream batch; returns `AppError::CircuitOpen` if the breaker
    /// has not yet reached its reset timeout.
    pub async fn guard(&self) -> Result<(), AppError> {
        match self.state().await? {
            BreakerState::Open => Err(AppError::CircuitOpen),
            BreakerState::Closed | BreakerState::HalfOpen => Ok(()),
        }
    }

    pub async fn record_success(&self) -> Result<(), AppError> {
        self.kv.delete(&self.failures_key()).await?;
        self.kv
            .set_with_ttl(
                &self.state_key(),
                "closed".to_string(),
                Duration::from_secs(3600),
            )
            .await?;
        Ok(())
    }

    pub async fn record_failure(&self) -> Result<(), AppError> {
        let failures = self
            .kv
            .incr_with_ttl(&self.failures_key(), Duration::from_secs(3600))
            .await?;
        self.kv
            .set_with_ttl(
                &self.last_failure_key(),
                Utc::now().timestamp_millis().to_string(),
                Duration::from_secs(3600),
            )
            .await?;

        if failures >= cfg.circuit_breaker.failure_threshold as i64 {
            self.kv
                .set_with_ttl(
                    &self.state_key(),
                    "open".to_string(),
                    Duration::from_secs(3600),
                )
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKvStore;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(Arc::new(InMemoryKvStore::new()), "youtube")
    }

    #[tokio::test]
    async fn starts_closed() {
        let b = breaker();
        assert_eq!(b.state().await.unwrap(), BreakerState::Closed);
        assert!(b.guard().await.is_ok());
    }

    #[tokio::test]
    async fn opens_after_threshold_failures() {
        let b = breaker();
        for _ in 0..cfg.circuit_breaker.failure_threshold {
            b.record_failure().await.unwrap();
        }
        assert_eq!(b.state().await.unwrap(), BreakerState::Open);
        assert!(matches!(b.guard().await, Err(AppError::CircuitOpen)));
    }

    #[tokio::test]
    async fn success_resets_to_closed() {
        let b = breaker();
        for _ in 0..cfg.circuit_breaker.failure_threshold {
            b.record_failure().await.unwrap();
        }
        b.record_success().await.unwrap();
        assert_eq!(b.state().await.unwrap(), BreakerState::Closed);
    }
}
