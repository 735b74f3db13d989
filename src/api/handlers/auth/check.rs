//! Session check endpoint.
//!
//! Verifies the access credential (cookie first, then bearer header) and
//! echoes the identity it carries. The response also re-seeds the CSRF
//! cookie so long-lived tabs keep a valid double-submit pair.

use super::{
    cookies::{bearer_token, cookie_value, csrf_cookie, ACCESS_COOKIE},
    csrf,
    error::AuthError,
    state::AuthState,
    types::CheckResponse,
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
    get,
    path = "/auth/check",
    responses(
        (status = 200, description = "Access credential is valid", body = CheckResponse),
        (status = 401, description = "Missing, invalid or expired access credential", body = super::types::Detail)
    ),
    tag = "auth"
)]
pub async fn check(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    match process_check(&auth_state, &headers) {
        Ok((response_headers, body)) => {
            (StatusCode::OK, response_headers, Json(body)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

fn process_check(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<(HeaderMap, CheckResponse), AuthError> {
    let token = cookie_value(headers, ACCESS_COOKIE)
        .or_else(|| bearer_token(headers))
        .ok_or(AuthError::InvalidToken)?;

    let claims = state.vault().verify_access(&token)?;

    let config = state.config();
    let mut response_headers = HeaderMap::new();
    let csrf_token = csrf::generate_token()?;
    response_headers.append(
        SET_COOKIE,
        csrf_cookie(&csrf_token, config.refresh_ttl(), config.cookie_secure())
            .context("invalid CSRF cookie")?,
    );

    Ok((
        response_headers,
        CheckResponse {
            id: claims.sub,
            name: claims.username,
        },
    ))
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
    use axum::http::header::{AUTHORIZATION, COOKIE};
    use axum::http::HeaderValue;
    use secrecy::SecretString;
    use uuid::Uuid;

    fn state() -> AuthState {
        let store = Arc::new(MemoryCounterStore::new()) as Arc<dyn CounterStore>;
        AuthState::new(
            AuthConfig::new("http://localhost:5173".to_string()),
            BanEngine::new(Arc::clone(&store), StorePolicy::FailOpen),
            Arc::new(NoopRateLimiter),
            TokenVault::new(&SecretString::from("check-test-secret".to_string()), store),
            Arc::new(MockIdentityStore::new("alice", "hunter2")),
            Arc::new(MemoryLedger::default()),
            StorePolicy::FailOpen,
        )
    }

    #[tokio::test]
    async fn cookie_credential_is_accepted() {
        let state = state();
        let user_id = Uuid::new_v4();
        let pair = state.vault().issue(user_id, "alice").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("access_token={}", pair.access)).unwrap(),
        );

        let (response_headers, body) = process_check(&state, &headers).unwrap();
        assert_eq!(body.id, user_id);
        assert_eq!(body.name, "alice");

        let cookie = response_headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("csrf_token="));
    }

    #[tokio::test]
    async fn bearer_credential_is_accepted() {
        let state = state();
        let pair = state.vault().issue(Uuid::new_v4(), "alice").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", pair.access)).unwrap(),
        );

        let (_, body) = process_check(&state, &headers).unwrap();
        assert_eq!(body.name, "alice");
    }

    #[tokio::test]
    async fn missing_credential_is_rejected() {
        let state = state();
        let err = process_check(&state, &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn refresh_credential_is_not_an_access_credential() {
        let state = state();
        let pair = state.vault().issue(Uuid::new_v4(), "alice").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("access_token={}", pair.refresh)).unwrap(),
        );
        let err = process_check(&state, &headers).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
