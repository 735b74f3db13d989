//! Token lifecycle: issue, refresh, revoke.
//!
//! Access and refresh credentials are HS256 JWTs bound to one identity. The
//! access credential is stateless and short-lived; the refresh credential is
//! long-lived and carries a unique `jti` so it can be revoked. Revoked ids
//! live in the shared counter store (`revoked:{jti}`) with a TTL equal to
//! the refresh lifetime, so every instance rejects a replayed credential and
//! entries age out once the credential could no longer be valid anyway.

use crate::store::{CounterStore, StoreError};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_ACCESS_TTL_SECONDS: u64 = 5 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: u64 = 14 * 24 * 60 * 60;

const REVOKED_KEY_PREFIX: &str = "revoked:";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("expired token")]
    Expired,
    #[error("revoked token")]
    Revoked,
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by both credential kinds.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
    pub kind: TokenKind,
}

/// Access/refresh credential pair minted on successful authentication.
#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues, refreshes, and revokes signed credentials.
///
/// One vault is constructed at service start and shared via `Arc`; the
/// revocation set rides on the injected counter store so revocation is
/// visible to every instance.
pub struct TokenVault {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    store: Arc<dyn CounterStore>,
}

impl TokenVault {
    #[must_use]
    pub fn new(secret: &SecretString, store: Arc<dyn CounterStore>) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::from_secs(DEFAULT_ACCESS_TTL_SECONDS),
            refresh_ttl: Duration::from_secs(DEFAULT_REFRESH_TTL_SECONDS),
            store,
        }
    }

    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Mint a fresh access/refresh pair bound to `identity`.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<TokenPair, TokenError> {
        let access = self.mint(user_id, username, TokenKind::Access, self.access_ttl)?;
        let refresh = self.mint(user_id, username, TokenKind::Refresh, self.refresh_ttl)?;
        Ok(TokenPair { access, refresh })
    }

    /// Exchange a refresh credential for a new access credential.
    ///
    /// The refresh credential itself is not rotated; it stays valid until
    /// logout or natural expiry.
    ///
    /// # Errors
    /// `Invalid` for malformed/mis-kinded tokens, `Expired` past expiry,
    /// `Revoked` when the jti is in the revocation set, `Store` when the
    /// revocation set is unreachable (never silently skipped).
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.decode_kind(refresh_token, TokenKind::Refresh, true)?;
        if self
            .store
            .exists(&format!("{REVOKED_KEY_PREFIX}{}", claims.jti))
            .await?
        {
            return Err(TokenError::Revoked);
        }
        self.mint(claims.sub, &claims.username, TokenKind::Access, self.access_ttl)
    }

    /// Add a refresh credential's jti to the revocation set.
    ///
    /// Idempotent, and a no-op for malformed or already-expired input:
    /// logout must always succeed from the caller's perspective.
    ///
    /// # Errors
    /// Only `Store` errors surface; they are the caller's policy decision.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), TokenError> {
        // Expired credentials still decode here: a jti may outlive its exp
        // in a replayed cookie, and revoking it keeps the set consistent.
        let Ok(claims) = self.decode_kind(refresh_token, TokenKind::Refresh, false) else {
            return Ok(());
        };
        self.store
            .set_expiring(&format!("{REVOKED_KEY_PREFIX}{}", claims.jti), self.refresh_ttl)
            .await?;
        Ok(())
    }

    /// Validate an access credential and return its claims.
    ///
    /// # Errors
    /// `Invalid` for malformed/mis-kinded tokens, `Expired` past expiry.
    pub fn verify_access(&self, access_token: &str) -> Result<Claims, TokenError> {
        self.decode_kind(access_token, TokenKind::Access, true)
    }

    fn mint(
        &self,
        user_id: Uuid,
        username: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
            jti: Uuid::new_v4(),
            kind,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    fn decode_kind(
        &self,
        token: &str,
        kind: TokenKind,
        validate_exp: bool,
    ) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = validate_exp;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?
            .claims;

        // An access credential must never pass where a refresh is expected,
        // and vice versa.
        if claims.kind != kind {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }
}
