use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use uuid::Uuid;

/// Token request (login)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedToken {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordInput {
    pub email: String,
    pub password: String,
}

/// Echo of a password change; `password` is always blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordOutput {
    pub email: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: String,
    pub full_name: String,
    pub is_barber: bool,
    pub is_superuser: bool,
    pub info: Json,
    pub jwt_id: Uuid,
    /// `is_active` and status active.
    pub active: bool,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
}
