//! Login attempt ledger.
//!
//! One immutable row per authentication attempt that reaches credential
//! verification. Banned origins short-circuit earlier and leave no entry;
//! only real verification attempts are audited. No read API here, reporting
//! is an external concern.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::Instrument;

/// Immutable audit record; `occurred_at` defaults at the database.
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    pub actor: String,
    pub succeeded: bool,
    pub origin: String,
    pub client_descriptor: String,
    pub failure_reason: Option<String>,
}

impl LoginAttempt {
    #[must_use]
    pub fn success(actor: &str, origin: &str, client_descriptor: &str) -> Self {
        Self {
            actor: actor.to_string(),
            succeeded: true,
            origin: origin.to_string(),
            client_descriptor: client_descriptor.to_string(),
            failure_reason: None,
        }
    }

    #[must_use]
    pub fn failure(actor: &str, origin: &str, client_descriptor: &str, reason: &str) -> Self {
        Self {
            actor: actor.to_string(),
            succeeded: false,
            origin: origin.to_string(),
            client_descriptor: client_descriptor.to_string(),
            failure_reason: Some(reason.to_string()),
        }
    }
}

#[async_trait]
pub trait AttemptLedger: Send + Sync {
    /// Durably append one attempt record.
    async fn record(&self, attempt: LoginAttempt) -> Result<()>;
}

/// Postgres-backed ledger.
pub struct PgAttemptLedger {
    pool: PgPool,
}

impl PgAttemptLedger {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptLedger for PgAttemptLedger {
    async fn record(&self, attempt: LoginAttempt) -> Result<()> {
        let query = r"
            INSERT INTO login_attempts
                (username, succeeded, origin_address, client_descriptor, failure_reason)
            VALUES ($1, $2, $3, $4, $5)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&attempt.actor)
            .bind(attempt.succeeded)
            .bind(&attempt.origin)
            .bind(&attempt.client_descriptor)
            .bind(&attempt.failure_reason)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to record login attempt")?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// In-memory ledger for handler tests.
    #[derive(Default)]
    pub(crate) struct MemoryLedger {
        pub(crate) entries: Mutex<Vec<LoginAttempt>>,
    }

    #[async_trait]
    impl AttemptLedger for MemoryLedger {
        async fn record(&self, attempt: LoginAttempt) -> Result<()> {
            self.entries.lock().await.push(attempt);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_entries_carry_a_reason() {
        let attempt = LoginAttempt::failure("alice", "1.2.3.4", "curl/8.0", "Invalid credentials");
        assert!(!attempt.succeeded);
        assert_eq!(attempt.failure_reason.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn success_entries_have_no_reason() {
        let attempt = LoginAttempt::success("alice", "1.2.3.4", "curl/8.0");
        assert!(attempt.succeeded);
        assert!(attempt.failure_reason.is_none());
    }
}
