//! Claims payload returned by the token endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;
use super::tokens::{TokenSigner, TokenType};

/// Token pair plus the account fields the client needs at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsPayload {
    pub token: String,
    pub refresh: String,
    pub jwt_id: Uuid,
    pub info: Json,
    pub is_barber: bool,
    pub is_superuser: bool,
    pub name: String,
    /// Always null.
    pub danger: Option<String>,
    /// Always empty.
    pub warn: Vec<String>,
}

/// Sign a token pair for an already-authenticated user.
pub fn issue(signer: &TokenSigner, user: &AuthUser) -> Result<ClaimsPayload, AuthError> {
    Ok(ClaimsPayload {
        token: signer.sign(user.id, user.jwt_id, TokenType::Access)?,
        refresh: signer.sign(user.id, user.jwt_id, TokenType::Refresh)?,
        jwt_id: user.jwt_id,
        info: user.info.clone(),
        is_barber: user.is_barber,
        is_superuser: user.is_superuser,
        name: user.full_name.clone(),
        danger: None,
        warn: Vec::new(),
    })
}
