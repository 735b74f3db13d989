//! Counter store client: the shared TTL-capable key-value store.
//!
//! Violation counters, bans, limiter windows, and revoked refresh ids all
//! live here so every service instance observes the same state. The contract
//! is deliberately small: atomic increment with window refresh, expiring
//! presence flags, existence checks, and remaining-TTL queries. No
//! client-side read-modify-write is allowed; increments are atomic at the
//! store.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use memory::MemoryCounterStore;
pub use redis::RedisCounterStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("counter store unavailable: {0}")]
    Unavailable(#[from] ::redis::RedisError),
    #[error("counter store operation timed out")]
    Timeout,
}

/// What to do when the counter store is unreachable.
///
/// Fail-open keeps logins available during a store outage at the cost of
/// suspending abuse mitigation; fail-closed turns a store outage into a
/// login outage. Either way the fault is logged at `error!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePolicy {
    FailOpen,
    FailClosed,
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment `key` (absent keys start at 0) and refresh its
    /// expiry to `window` in the same atomic unit. Returns the
    /// post-increment count.
    async fn increment(&self, key: &str, window: Duration) -> Result<i64, StoreError>;

    /// Set `key` as a presence flag expiring after `ttl`, overwriting any
    /// previous expiry.
    async fn set_expiring(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Whether `key` currently exists (i.e., has not expired).
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Remaining lifetime of `key`, or `None` when absent or persistent.
    async fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;
}
