//! HS256 access/refresh tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub token_type: TokenType,
    /// Copy of the user's `jwt_id` at issue time.
    pub jwt_id: Uuid,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    pub fn sign(&self, user_id: Uuid, jwt_id: Uuid, token_type: TokenType) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            jwt_id,
            jti: Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature and expiry, and that the token is of the expected type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        if data.claims.token_type != expected {
            return Err(AuthError::TokenError("wrong token type".into()));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_verifies() {
        let signer = TokenSigner::new("secret", 60, 120);
        let (uid, jid) = (Uuid::new_v4(), Uuid::new_v4());
        let token = signer.sign(uid, jid, TokenType::Access).unwrap();
        let claims = signer.verify(&token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, uid.to_string());
        assert_eq!(claims.jwt_id, jid);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let signer = TokenSigner::new("secret", 60, 120);
        let token = signer.sign(Uuid::new_v4(), Uuid::new_v4(), TokenType::Refresh).unwrap();
        assert!(matches!(signer.verify(&token, TokenType::Access), Err(AuthError::TokenError(_))));
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = TokenSigner::new("one", 60, 120).sign(Uuid::new_v4(), Uuid::new_v4(), TokenType::Access).unwrap();
        assert!(TokenSigner::new("two", 60, 120).verify(&token, TokenType::Access).is_err());
    }
}
