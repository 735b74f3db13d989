//! Logout endpoint.
//!
//! Revokes the refresh credential when one is present and clears every
//! auth cookie. Logout always succeeds: a missing, malformed or expired
//! refresh cookie still results in cleared cookies and a 200, and a store
//! fault during revocation is logged rather than surfaced.

use super::{
    cookies::{clear_cookie, cookie_value, ACCESS_COOKIE, CSRF_COOKIE, REFRESH_COOKIE},
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
use tracing::error;

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session ended; all auth cookies cleared", body = MessageResponse),
        (status = 403, description = "CSRF check failed", body = super::types::Detail)
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Some(refresh_token) = cookie_value(&headers, REFRESH_COOKIE) {
        // Revocation is best effort here; the cookies are cleared either
        // way and the credential ages out at its natural expiry.
        if let Err(err) = auth_state.vault().revoke(&refresh_token).await {
            error!("Failed to revoke refresh token on logout: {err}");
        }
    }

    match clear_all_cookies(&auth_state) {
        Ok(response_headers) => (
            StatusCode::OK,
            response_headers,
            Json(MessageResponse {
                message: "Logged out".to_string(),
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

fn clear_all_cookies(state: &AuthState) -> Result<HeaderMap, AuthError> {
    let secure = state.config().cookie_secure();
    let mut headers = HeaderMap::new();
    for name in [ACCESS_COOKIE, REFRESH_COOKIE, CSRF_COOKIE] {
        headers.append(
            SET_COOKIE,
            clear_cookie(name, secure).context("invalid expiry cookie")?,
        );
    }
    Ok(headers)
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
    use crate::token::{TokenError, TokenVault};
    use secrecy::SecretString;
    use uuid::Uuid;

    fn state_with_store(store: Arc<dyn CounterStore>) -> AuthState {
        AuthState::new(
            AuthConfig::new("http://localhost:5173".to_string()),
            BanEngine::new(Arc::clone(&store), StorePolicy::FailOpen),
            Arc::new(NoopRateLimiter),
            TokenVault::new(&SecretString::from("logout-test-secret".to_string()), store),
            Arc::new(MockIdentityStore::new("alice", "hunter2")),
            Arc::new(MemoryLedger::default()),
            StorePolicy::FailOpen,
        )
    }

    #[test]
    fn all_three_cookies_are_expired() {
        let state = state_with_store(Arc::new(MemoryCounterStore::new()));
        let headers = clear_all_cookies(&state).unwrap();
        let cookies: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 3);
        for cookie in &cookies {
            assert!(cookie.contains("Max-Age=0"));
        }
        assert!(cookies[0].starts_with("access_token="));
        assert!(cookies[1].starts_with("refresh_token="));
        assert!(cookies[2].starts_with("csrf_token="));
    }

    #[tokio::test]
    async fn revocation_holds_across_instances_sharing_a_store() {
        let store = Arc::new(MemoryCounterStore::new()) as Arc<dyn CounterStore>;
        let first = state_with_store(Arc::clone(&store));
        let second = state_with_store(store);

        let pair = first.vault().issue(Uuid::new_v4(), "alice").unwrap();
        first.vault().revoke(&pair.refresh).await.unwrap();

        let err = second.vault().refresh(&pair.refresh).await.unwrap_err();
        assert!(matches!(err, TokenError::Revoked));
    }
}
