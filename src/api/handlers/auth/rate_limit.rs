//! Rate limiting for the login endpoint.
//!
//! A fixed window over the shared counter store: the classification happens
//! before any handler logic, and the window counter lives next to the ban
//! state so every instance sees the same picture.

use crate::store::{CounterStore, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const LIMIT_KEY_PREFIX: &str = "rl:";

pub(crate) const DEFAULT_MAX_ATTEMPTS: i64 = 5;
pub(crate) const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Classify one request from `origin`, counting it against the window.
    async fn check(&self, origin: &str) -> Result<RateLimitDecision, StoreError>;
}

/// Fixed-window limiter, default 5 attempts per 60 s.
pub struct FixedWindowLimiter {
    store: Arc<dyn CounterStore>,
    max_attempts: i64,
    window: Duration,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: DEFAULT_WINDOW,
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: i64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn check(&self, origin: &str) -> Result<RateLimitDecision, StoreError> {
        let count = self
            .store
            .increment(&format!("{LIMIT_KEY_PREFIX}{origin}"), self.window)
            .await?;
        if count > self.max_attempts {
            Ok(RateLimitDecision::Limited)
        } else {
            Ok(RateLimitDecision::Allowed)
        }
    }
}

/// Limiter that never limits; used in development setups.
#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

#[async_trait]
impl RateLimiter for NoopRateLimiter {
    async fn check(&self, _origin: &str) -> Result<RateLimitDecision, StoreError> {
        Ok(RateLimitDecision::Allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCounterStore;

    #[tokio::test]
    async fn allows_up_to_the_limit_then_limits() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = FixedWindowLimiter::new(store).with_max_attempts(3);

        for _ in 0..3 {
            assert_eq!(
                limiter.check("1.2.3.4").await.unwrap(),
                RateLimitDecision::Allowed
            );
        }
        assert_eq!(
            limiter.check("1.2.3.4").await.unwrap(),
            RateLimitDecision::Limited
        );
    }

    #[tokio::test]
    async fn origins_are_independent() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = FixedWindowLimiter::new(store).with_max_attempts(1);

        assert_eq!(
            limiter.check("1.1.1.1").await.unwrap(),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check("1.1.1.1").await.unwrap(),
            RateLimitDecision::Limited
        );
        assert_eq!(
            limiter.check("2.2.2.2").await.unwrap(),
            RateLimitDecision::Allowed
        );
    }

    #[tokio::test]
    async fn window_expiry_clears_the_count() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = FixedWindowLimiter::new(Arc::clone(&store) as Arc<dyn CounterStore>)
            .with_max_attempts(1)
            .with_window(Duration::from_secs(60));

        limiter.check("1.2.3.4").await.unwrap();
        assert_eq!(
            limiter.check("1.2.3.4").await.unwrap(),
            RateLimitDecision::Limited
        );

        store.advance(Duration::from_secs(61)).await;
        assert_eq!(
            limiter.check("1.2.3.4").await.unwrap(),
            RateLimitDecision::Allowed
        );
    }

    #[tokio::test]
    async fn noop_always_allows() {
        assert_eq!(
            NoopRateLimiter.check("1.2.3.4").await.unwrap(),
            RateLimitDecision::Allowed
        );
    }
}
