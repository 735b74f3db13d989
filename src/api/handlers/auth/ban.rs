//! Progressive violation/ban engine.
//!
//! Violations accumulate per origin in a sliding one-hour window; each one
//! sets (or overwrites) a ban whose duration follows a fixed ladder. The
//! ladder is deliberately simple: the first violation is a short cooldown
//! that absorbs typos, the second a noticeable penalty, the third and later
//! a firm throttle.

use crate::store::{CounterStore, StoreError, StorePolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

const VIOLATION_KEY_PREFIX: &str = "rate_violation:";
const BAN_KEY_PREFIX: &str = "ban:";

/// Sliding violation window W; refreshed on every increment.
const VIOLATION_WINDOW: Duration = Duration::from_secs(3600);

const FIRST_BAN: Duration = Duration::from_secs(60);
const SECOND_BAN: Duration = Duration::from_secs(600);
/// Terminal tier; escalation caps here.
const CAPPED_BAN: Duration = Duration::from_secs(1800);

pub struct BanEngine {
    store: Arc<dyn CounterStore>,
    policy: StorePolicy,
}

impl BanEngine {
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>, policy: StorePolicy) -> Self {
        Self { store, policy }
    }

    /// Whether `origin` is currently banned.
    ///
    /// # Errors
    /// Surfaces `StoreError` only under fail-closed policy; fail-open treats
    /// an unreachable store as "not banned" after logging the fault.
    pub async fn is_banned(&self, origin: &str) -> Result<bool, StoreError> {
        match self.store.exists(&ban_key(origin)).await {
            Ok(banned) => Ok(banned),
            Err(err) => self.apply_policy(err, false),
        }
    }

    /// Remaining ban duration for `origin`, `None` when not banned.
    ///
    /// # Errors
    /// Same policy handling as [`Self::is_banned`].
    pub async fn remaining_ban(&self, origin: &str) -> Result<Option<Duration>, StoreError> {
        match self.store.remaining_ttl(&ban_key(origin)).await {
            Ok(remaining) => Ok(remaining),
            Err(err) => self.apply_policy(err, None),
        }
    }

    /// Record one violation for `origin` and set the ban for the resulting
    /// tier. The counter increment and window refresh are one atomic store
    /// operation; the ban duration is derived from the post-increment count,
    /// so concurrent violations land on a consistent tier.
    ///
    /// # Errors
    /// Same policy handling as [`Self::is_banned`]; fail-open drops the
    /// violation rather than the login.
    pub async fn record_violation(&self, origin: &str) -> Result<(), StoreError> {
        let count = match self
            .store
            .increment(&violation_key(origin), VIOLATION_WINDOW)
            .await
        {
            Ok(count) => count,
            Err(err) => return self.apply_policy(err, ()),
        };

        let duration = ban_duration(count);
        if let Err(err) = self.store.set_expiring(&ban_key(origin), duration).await {
            return self.apply_policy(err, ());
        }
        Ok(())
    }

    fn apply_policy<T>(&self, err: StoreError, fallback: T) -> Result<T, StoreError> {
        error!("Counter store failure in ban engine: {err}");
        match self.policy {
            StorePolicy::FailOpen => Ok(fallback),
            StorePolicy::FailClosed => Err(err),
        }
    }
}

/// Escalation ladder keyed by the post-increment violation count.
const fn ban_duration(count: i64) -> Duration {
    match count {
        i64::MIN..=1 => FIRST_BAN,
        2 => SECOND_BAN,
        _ => CAPPED_BAN,
    }
}

fn ban_key(origin: &str) -> String {
    format!("{BAN_KEY_PREFIX}{origin}")
}

fn violation_key(origin: &str) -> String {
    format!("{VIOLATION_KEY_PREFIX}{origin}")
}
