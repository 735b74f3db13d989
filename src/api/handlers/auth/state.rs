//! Auth state and configuration.

use super::ban::BanEngine;
use super::identity::IdentityStore;
use super::ledger::AttemptLedger;
use super::rate_limit::RateLimiter;
use crate::store::StorePolicy;
use crate::token::TokenVault;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_ACCESS_TTL_SECONDS: u64 = 5 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: u64 = 14 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: u64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: u64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_seconds)
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_seconds)
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    pub(crate) fn cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

/// Everything the auth endpoints need, constructed once at service start.
pub struct AuthState {
    config: AuthConfig,
    bans: BanEngine,
    limiter: Arc<dyn RateLimiter>,
    vault: TokenVault,
    identity: Arc<dyn IdentityStore>,
    ledger: Arc<dyn AttemptLedger>,
    store_policy: StorePolicy,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        bans: BanEngine,
        limiter: Arc<dyn RateLimiter>,
        vault: TokenVault,
        identity: Arc<dyn IdentityStore>,
        ledger: Arc<dyn AttemptLedger>,
        store_policy: StorePolicy,
    ) -> Self {
        Self {
            config,
            bans,
            limiter,
            vault,
            identity,
            ledger,
            store_policy,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn bans(&self) -> &BanEngine {
        &self.bans
    }

    pub(crate) fn limiter(&self) -> &dyn RateLimiter {
        self.limiter.as_ref()
    }

    pub(crate) fn vault(&self) -> &TokenVault {
        &self.vault
    }

    pub(crate) fn identity(&self) -> &dyn IdentityStore {
        self.identity.as_ref()
    }

    pub(crate) fn ledger(&self) -> &dyn AttemptLedger {
        self.ledger.as_ref()
    }

    pub(crate) fn store_policy(&self) -> StorePolicy {
        self.store_policy
    }
}
