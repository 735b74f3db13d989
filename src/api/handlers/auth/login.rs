//! Login endpoint: the authentication orchestrator.
//!
//! Stage order is load-bearing: ban check, rate-limit classification,
//! credential verification, ledger append, token issuance. A banned origin
//! is rejected before any password comparison and leaves no ledger entry.

use super::{
    cookies::{credential_cookie, csrf_cookie, ACCESS_COOKIE, REFRESH_COOKIE},
    csrf,
    error::AuthError,
    identity::Identity,
    ledger::LoginAttempt,
    rate_limit::RateLimitDecision,
    state::AuthState,
    types::{TokenRequest, TokenResponse},
    utils::{client_descriptor, client_origin, valid_username},
};
use crate::store::StorePolicy;
use crate::token::TokenPair;
use anyhow::Context;
use axum::{
    extract::{ConnectInfo, Extension},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

const INVALID_CREDENTIALS_REASON: &str = "Invalid credentials";

#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Authenticated; credentials set as cookies", body = TokenResponse),
        (status = 400, description = "Missing payload", body = super::types::Detail),
        (status = 401, description = "Invalid credentials", body = super::types::Detail),
        (status = 429, description = "Rate limited or temporarily banned", body = super::types::Detail)
    ),
    tag = "auth"
)]
pub async fn token(
    headers: HeaderMap,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<TokenRequest>>,
) -> impl IntoResponse {
    let request: TokenRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Missing payload" })),
            )
                .into_response()
        }
    };

    let origin = client_origin(&headers, Some(peer));
    let descriptor = client_descriptor(&headers);

    match process_login(&auth_state, &origin, &descriptor, &request).await {
        Ok(outcome) => {
            info!(username = %outcome.identity.username, "Login succeeded");
            let response_headers = match issue_cookies(&auth_state, &outcome.pair) {
                Ok(response_headers) => response_headers,
                Err(err) => return err.into_response(),
            };
            let body = TokenResponse {
                user_id: outcome.identity.id,
                username: outcome.identity.username,
            };
            (StatusCode::OK, response_headers, Json(body)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[derive(Debug)]
pub(super) struct LoginOutcome {
    pub(super) identity: Identity,
    pub(super) pair: TokenPair,
}

/// Run the login pipeline for one request.
pub(super) async fn process_login(
    state: &AuthState,
    origin: &str,
    descriptor: &str,
    request: &TokenRequest,
) -> Result<LoginOutcome, AuthError> {
    // Banned origins are rejected before any verification work; no ledger
    // entry is produced for them.
    if state.bans().is_banned(origin).await? {
        let remaining = state
            .bans()
            .remaining_ban(origin)
            .await?
            .unwrap_or_default();
        return Err(AuthError::Banned {
            remaining: remaining.as_secs(),
        });
    }

    let decision = match state.limiter().check(origin).await {
        Ok(decision) => decision,
        Err(err) => match state.store_policy() {
            StorePolicy::FailOpen => {
                error!("Rate limiter unavailable, failing open: {err}");
                RateLimitDecision::Allowed
            }
            StorePolicy::FailClosed => return Err(err.into()),
        },
    };
    if decision == RateLimitDecision::Limited {
        // Exceeding the limit is a violation; attempting again while the
        // window is hot compounds the ban tier.
        state.bans().record_violation(origin).await?;
        return Err(AuthError::RateLimited);
    }

    if !valid_username(&request.username) {
        state
            .ledger()
            .record(LoginAttempt::failure(
                &request.username,
                origin,
                descriptor,
                INVALID_CREDENTIALS_REASON,
            ))
            .await?;
        return Err(AuthError::InvalidCredentials);
    }

    let identity = state
        .identity()
        .authenticate(&request.username, &request.password)
        .await?;

    let Some(identity) = identity else {
        state
            .ledger()
            .record(LoginAttempt::failure(
                &request.username,
                origin,
                descriptor,
                INVALID_CREDENTIALS_REASON,
            ))
            .await?;
        return Err(AuthError::InvalidCredentials);
    };

    state
        .ledger()
        .record(LoginAttempt::success(
            &identity.username,
            origin,
            descriptor,
        ))
        .await?;

    let pair = state.vault().issue(identity.id, &identity.username)?;
    Ok(LoginOutcome { identity, pair })
}

/// Build the Set-Cookie headers for a fresh credential pair, plus the CSRF
/// seed cookie the double-submit gate expects back.
fn issue_cookies(state: &AuthState, pair: &TokenPair) -> Result<HeaderMap, AuthError> {
    let config = state.config();
    let secure = config.cookie_secure();

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        credential_cookie(ACCESS_COOKIE, &pair.access, config.access_ttl(), secure)
            .context("invalid access cookie")?,
    );
    headers.append(
        SET_COOKIE,
        credential_cookie(REFRESH_COOKIE, &pair.refresh, config.refresh_ttl(), secure)
            .context("invalid refresh cookie")?,
    );
    let csrf_token = csrf::generate_token()?;
    headers.append(
        SET_COOKIE,
        csrf_cookie(&csrf_token, config.refresh_ttl(), secure)
            .context("invalid CSRF cookie")?,
    );
    Ok(headers)
}
