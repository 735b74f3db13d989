//! Access-token refresh endpoint.
//!
//! Reads the refresh credential from its `HttpOnly` cookie, checks it
//! against the revocation set and mints a new access credential. The
//! refresh credential itself is not rotated.

use super::{
    cookies::{cookie_value, credential_cookie, ACCESS_COOKIE, REFRESH_COOKIE},
    error::AuthError,
    state::AuthState,
    types::MessageResponse,
};
use anyhow::Context;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/auth/token/refresh",
    responses(
        (status = 200, description = "New access credential set as a cookie", body = MessageResponse),
        (status = 400, description = "Missing refresh token", body = super::types::Detail),
        (status = 401, description = "Invalid, expired or revoked refresh token", body = super::types::Detail),
        (status = 403, description = "CSRF check failed", body = super::types::Detail)
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    match process_refresh(&auth_state, &headers).await {
        Ok(response_headers) => (
            StatusCode::OK,
            response_headers,
            Json(MessageResponse {
                message: "Token refreshed".to_string(),
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn process_refresh(state: &AuthState, headers: &HeaderMap) -> Result<HeaderMap, AuthError> {
    let Some(refresh_token) = cookie_value(headers, REFRESH_COOKIE) else {
        return Err(AuthError::MissingRefreshToken);
    };

    let access = state.vault().refresh(&refresh_token).await?;

    let config = state.config();
    let mut response_headers = HeaderMap::new();
    response_headers.append(
        SET_COOKIE,
        credential_cookie(
            ACCESS_COOKIE,
            &access,
            config.access_ttl(),
            config.cookie_secure(),
        )
        .context("invalid access cookie")?,
    );
    Ok(response_headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::ban::BanEngine;
    use crate::api::handlers::auth::identity::testing::MockIdentityStore;
    use crate::api::handlers::auth::ledger::testing::MemoryLedger;
    use crate::api::handlers::auth::rate_limit::NoopRateLimiter;
    use crate::api::handlers::auth::state::AuthConfig;
    use crate::store::{CounterStore, MemoryCounterStore, StorePolicy};
    use crate::token::TokenVault;
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;
    use secrecy::SecretString;
    use uuid::Uuid;

    fn state() -> AuthState {
        let store = Arc::new(MemoryCounterStore::new()) as Arc<dyn CounterStore>;
        AuthState::new(
            AuthConfig::new("http://localhost:5173".to_string()),
            BanEngine::new(Arc::clone(&store), StorePolicy::FailOpen),
            Arc::new(NoopRateLimiter),
            TokenVault::new(
                &SecretString::from("refresh-test-secret".to_string()),
                store,
            ),
            Arc::new(MockIdentityStore::new("alice", "hunter2")),
            Arc::new(MemoryLedger::default()),
            StorePolicy::FailOpen,
        )
    }

    fn cookie_headers(refresh_token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("refresh_token={refresh_token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn refresh_mints_a_new_access_cookie() {
        let state = state();
        let user_id = Uuid::new_v4();
        let pair = state.vault().issue(user_id, "alice").unwrap();

        let response_headers = process_refresh(&state, &cookie_headers(&pair.refresh))
            .await
            .unwrap();
        let cookie = response_headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("access_token="));

        let access = cookie
            .trim_start_matches("access_token=")
            .split(';')
            .next()
            .unwrap();
        let claims = state.vault().verify_access(access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn missing_cookie_is_a_client_error() {
        let state = state();
        let err = process_refresh(&state, &HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingRefreshToken));
    }

    #[tokio::test]
    async fn revoked_refresh_token_is_rejected() {
        let state = state();
        let pair = state.vault().issue(Uuid::new_v4(), "alice").unwrap();
        state.vault().revoke(&pair.refresh).await.unwrap();

        let err = process_refresh(&state, &cookie_headers(&pair.refresh))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RevokedToken));
    }

    #[tokio::test]
    async fn garbage_refresh_token_is_rejected() {
        let state = state();
        let err = process_refresh(&state, &cookie_headers("not-a-jwt"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn access_token_cannot_be_used_as_refresh() {
        let state = state();
        let pair = state.vault().issue(Uuid::new_v4(), "alice").unwrap();
        let err = process_refresh(&state, &cookie_headers(&pair.access))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
