//! Redis-backed counter store.

use super::{CounterStore, StoreError};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::future::Future;
use std::time::Duration;

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Counter store backed by a shared Redis instance.
///
/// The connection manager reconnects on failure and is cheap to clone; one
/// client is constructed at service start and injected everywhere the store
/// is needed. Every operation carries a bounded timeout so a wedged store
/// surfaces as `StoreError::Timeout` instead of a hung request.
#[derive(Clone)]
pub struct RedisCounterStore {
    manager: ConnectionManager,
    op_timeout: Duration,
}

impl RedisCounterStore {
    /// Connect to the store at `url` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the initial connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            manager,
            op_timeout: DEFAULT_OP_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, redis::RedisError>> + Send,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<i64, StoreError> {
        let mut conn = self.manager.clone();
        let key = key.to_string();
        // INCR + EXPIRE in one MULTI/EXEC so the window refresh can never be
        // lost between concurrent callers.
        self.bounded(async move {
            let (count,): (i64,) = redis::pipe()
                .atomic()
                .incr(&key, 1)
                .expire(&key, window.as_secs() as i64)
                .ignore()
                .query_async(&mut conn)
                .await?;
            Ok(count)
        })
        .await
    }

    async fn set_expiring(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let key = key.to_string();
        self.bounded(async move { conn.set_ex(&key, 1, ttl.as_secs()).await })
            .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let key = key.to_string();
        self.bounded(async move { conn.exists(&key).await }).await
    }

    async fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut conn = self.manager.clone();
        let key = key.to_string();
        // TTL returns -2 for a missing key and -1 for a key without expiry.
        let ttl: i64 = self.bounded(async move { conn.ttl(&key).await }).await?;
        if ttl < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl as u64)))
        }
    }
}
