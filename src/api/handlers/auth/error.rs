//! Error taxonomy for the auth endpoints.
//!
//! Every variant is terminal for the request. Responses never reveal whether
//! a submitted username exists: credential failures share one uniform
//! message, and ban/rate responses only talk about the origin.

use crate::store::StoreError;
use crate::token::TokenError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("origin temporarily banned, {remaining} seconds remaining")]
    Banned { remaining: u64 },
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("expired token")]
    ExpiredToken,
    #[error("revoked token")]
    RevokedToken,
    #[error("missing refresh token")]
    MissingRefreshToken,
    #[error("CSRF check failed: {reason}")]
    CsrfFailure { reason: String },
    #[error("counter store unavailable")]
    StoreUnavailable,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => Self::InvalidToken,
            TokenError::Expired => Self::ExpiredToken,
            TokenError::Revoked => Self::RevokedToken,
            TokenError::Store(_) => Self::StoreUnavailable,
            TokenError::Signing(err) => Self::Internal(anyhow::Error::new(err)),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(_: StoreError) -> Self {
        Self::StoreUnavailable
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = match &self {
            Self::Banned { remaining } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Temporarily banned: too many login attempts, {remaining} seconds remaining"),
            ),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts!".to_string(),
            ),
            Self::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            Self::ExpiredToken => (StatusCode::UNAUTHORIZED, "Expired token".to_string()),
            Self::RevokedToken => (StatusCode::UNAUTHORIZED, "Revoked token".to_string()),
            Self::MissingRefreshToken => {
                (StatusCode::BAD_REQUEST, "Missing refresh token".to_string())
            }
            Self::CsrfFailure { reason } => {
                (StatusCode::FORBIDDEN, format!("CSRF Failed: {reason}"))
            }
            Self::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            Self::Internal(err) => {
                error!("Internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banned_reports_remaining_seconds() {
        let response = AuthError::Banned { remaining: 1793 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn token_errors_map_to_unauthorized() {
        for err in [TokenError::Invalid, TokenError::Expired, TokenError::Revoked] {
            let auth: AuthError = err.into();
            let response = auth.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn store_errors_map_to_service_unavailable() {
        let auth: AuthError = StoreError::Timeout.into();
        assert_eq!(
            auth.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
