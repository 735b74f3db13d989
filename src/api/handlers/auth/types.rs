//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Claims echoed to the client on successful login; the credentials
/// themselves travel only in cookies.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CheckResponse {
    pub id: Uuid,
    pub name: String,
}

/// Error body shape shared by every auth failure.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Detail {
    pub detail: String,
}
