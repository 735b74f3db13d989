//! In-memory counter store.
//!
//! Backs unit tests (with a shiftable clock) and single-instance
//! development. Not suitable for multi-instance deployments: counters held
//! in process memory are invisible to other instances.

use super::{CounterStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry {
    count: i64,
    expires_at: Option<Instant>,
}

#[derive(Default)]
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, Entry>>,
    // Test clock offset; advance() shifts "now" forward without sleeping.
    offset: Mutex<Duration>,
}

impl MemoryCounterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the store clock forward, expiring entries whose TTL elapses.
    pub async fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().await;
        *offset += by;
    }

    async fn now(&self) -> Instant {
        Instant::now() + *self.offset.lock().await
    }

    async fn prune(&self, now: Instant) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.expires_at.is_none_or(|deadline| deadline > now));
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<i64, StoreError> {
        let now = self.now().await;
        self.prune(now).await;
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.to_string()).or_insert(Entry {
            count: 0,
            expires_at: None,
        });
        entry.count += 1;
        entry.expires_at = Some(now + window);
        Ok(entry.count)
    }

    async fn set_expiring(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = self.now().await;
        self.prune(now).await;
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                count: 1,
                expires_at: Some(now + ttl),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.now().await;
        self.prune(now).await;
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = self.now().await;
        self.prune(now).await;
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .and_then(|entry| entry.expires_at)
            .map(|deadline| deadline.saturating_duration_since(now)))
    }
}
