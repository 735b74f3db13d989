//! Identity store collaborator.
//!
//! Credential verification is delegated here; the gateway only learns
//! whether a username/password pair maps to an identity. Callers cannot
//! distinguish an unknown user from a wrong password.

use anyhow::{Context, Result};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// A dummy PHC string verified for unknown users so both outcomes cost one
/// Argon2 run.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY";

#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve a username/password pair to an identity, or `None` when the
    /// pair does not verify.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Identity>>;
}

/// Postgres-backed identity store verifying Argon2 password hashes.
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Identity>> {
        let query = "SELECT id, username, password_hash FROM users WHERE username = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user")?;

        let Some(row) = row else {
            // Verify against a dummy hash to keep unknown-user timing in
            // line with wrong-password timing.
            let _ = verify(DUMMY_HASH, password);
            return Ok(None);
        };

        let hash: String = row.get("password_hash");
        if verify(&hash, password) {
            Ok(Some(Identity {
                id: row.get("id"),
                username: row.get("username"),
            }))
        } else {
            Ok(None)
        }
    }
}

fn verify(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
