//! OpenAPI document for the service, served at `/openapi.json`.

use crate::api::handlers::{auth, health};
use axum::response::IntoResponse;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login::token,
        auth::refresh::refresh,
        auth::logout::logout,
        auth::check::check,
        health::health,
    ),
    components(schemas(
        auth::types::TokenRequest,
        auth::types::TokenResponse,
        auth::types::MessageResponse,
        auth::types::CheckResponse,
        auth::types::Detail,
        health::Health,
    )),
    tags(
        (name = "auth", description = "Credential and session endpoints"),
        (name = "health", description = "Service liveness")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
