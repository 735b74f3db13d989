//! CSRF double-submit gate.
//!
//! State-changing requests must present the CSRF token twice: in the
//! readable cookie and in the `X-CSRF-Token` header. The gate runs as a
//! middleware stage before any handler logic, so a mismatch can never leave
//! a partial mutation behind.

use super::cookies::{cookie_value, CSRF_COOKIE};
use super::error::AuthError;
use anyhow::{Context, Result};
use axum::{
    extract::Request,
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};

pub(crate) const CSRF_HEADER: &str = "x-csrf-token";

/// Create a new CSRF token to seed the readable cookie.
pub(crate) fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate CSRF token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Check the double-submit pair on a request.
///
/// # Errors
/// Returns `AuthError::CsrfFailure` with a diagnostic reason when either
/// half is missing or the halves disagree.
pub(crate) fn verify(headers: &HeaderMap) -> Result<(), AuthError> {
    let Some(cookie) = cookie_value(headers, CSRF_COOKIE) else {
        return Err(AuthError::CsrfFailure {
            reason: "CSRF cookie not set".to_string(),
        });
    };
    let Some(header) = headers.get(CSRF_HEADER).and_then(|value| value.to_str().ok()) else {
        return Err(AuthError::CsrfFailure {
            reason: "CSRF token missing".to_string(),
        });
    };
    if cookie != header {
        return Err(AuthError::CsrfFailure {
            reason: "CSRF token incorrect".to_string(),
        });
    }
    Ok(())
}

/// Middleware stage enforcing the double-submit check on state-changing
/// methods. Safe methods pass through untouched.
pub async fn csrf_gate(request: Request, next: Next) -> Response {
    let mutating = !matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS
    );
    if mutating {
        if let Err(err) = verify(request.headers()) {
            return err.into_response();
        }
    }
    next.run(request).await
}
