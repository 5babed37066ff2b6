use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::claims::{self, ClaimsPayload};
use super::domain::{AuthUser, ChangePasswordInput, ChangePasswordOutput, RefreshRequest, RefreshedToken, TokenRequest};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::tokens::{TokenSigner, TokenType};
use crate::password::{hash_password, verify_password, PasswordPolicy, UserAttributes};

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    signer: TokenSigner,
    policy: PasswordPolicy,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, signer: TokenSigner) -> Self { Self { repo, signer, policy: PasswordPolicy } }

    /// Check credentials and issue the claims payload.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, repository::mock::MockAuthRepository, tokens::TokenSigner};
    /// use service::auth::domain::{AuthUser, TokenRequest};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let jwt_id = uuid::Uuid::new_v4();
    /// repo.insert(
    ///     AuthUser { id: uuid::Uuid::new_v4(), username: Some("ana".into()), email: "ana@example.com".into(),
    ///         full_name: "Ana Rojas".into(), is_barber: true, is_superuser: false,
    ///         info: serde_json::json!({}), jwt_id, active: true },
    ///     service::password::hash_password("ValidP@ss1").unwrap(),
    /// );
    /// let svc = AuthService::new(repo, TokenSigner::new("secret", 3600, 86400));
    /// let req = TokenRequest { username: "ana".into(), password: "ValidP@ss1".into() };
    /// let payload = tokio_test::block_on(svc.obtain_token(req)).unwrap();
    /// assert_eq!(payload.jwt_id, jwt_id);
    /// assert!(payload.danger.is_none());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn obtain_token(&self, input: TokenRequest) -> Result<ClaimsPayload, AuthError> {
        let mut found = self.repo.find_by_username(&input.username).await?;
        if found.is_none() && input.username.contains('@') {
            found = self.repo.find_by_email(&input.username).await?;
        }
        let user = found.ok_or(AuthError::Unauthorized)?;

        let cred = self.repo.get_credentials(user.id).await?.ok_or(AuthError::Unauthorized)?;
        if !verify_password(&input.password, &cred.password_hash)? {
            return Err(AuthError::Unauthorized);
        }
        if !user.active {
            warn!(user_id = %user.id, "inactive_login_rejected");
            return Err(AuthError::Unauthorized);
        }

        self.repo.record_login(user.id).await?;
        let payload = claims::issue(&self.signer, &user)?;
        info!(user_id = %user.id, "token_issued");
        Ok(payload)
    }

    /// Exchange a refresh token for a new access token.
    #[instrument(skip(self, input))]
    pub async fn refresh(&self, input: RefreshRequest) -> Result<RefreshedToken, AuthError> {
        let user = self.user_for(&input.refresh, TokenType::Refresh).await?;
        let token = self.signer.sign(user.id, user.jwt_id, TokenType::Access)?;
        Ok(RefreshedToken { token })
    }

    /// Set a new password for the account behind `email`.
    ///
    /// The policy runs first; an unknown email is reported as "email invalid".
    #[instrument(skip(self, input))]
    pub async fn change_password(&self, input: ChangePasswordInput) -> Result<ChangePasswordOutput, AuthError> {
        let email = models::user::normalize_email(&input.email);
        let attrs = UserAttributes { email: Some(email.clone()), ..Default::default() };
        self.policy.validate(&input.password, &attrs).map_err(AuthError::Validation)?;

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::Validation(vec!["email invalid".into()]))?;

        let hash = hash_password(&input.password)?;
        self.repo.set_password(user.id, hash).await?;
        info!(user_id = %user.id, "password_changed");
        Ok(ChangePasswordOutput { email, password: String::new() })
    }

    /// Resolve a bearer access token to an active user.
    pub async fn verify_access(&self, token: &str) -> Result<AuthUser, AuthError> {
        self.user_for(token, TokenType::Access).await
    }

    async fn user_for(&self, token: &str, token_type: TokenType) -> Result<AuthUser, AuthError> {
        let claims = self.signer.verify(token, token_type)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthorized)?;
        let user = self.repo.find_by_id(user_id).await?.ok_or(AuthError::Unauthorized)?;
        if !user.active || user.jwt_id != claims.jwt_id {
            return Err(AuthError::Unauthorized);
        }
        Ok(user)
    }
}
