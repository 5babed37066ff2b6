use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    /// Store a new hash and rotate the user's `jwt_id`.
    async fn set_password(&self, user_id: Uuid, password_hash: String) -> Result<AuthUser, AuthError>;
    async fn record_login(&self, user_id: Uuid) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    impl MockAuthRepository {
        pub fn insert(&self, user: AuthUser, password_hash: String) {
            let user_id = user.id;
            self.users.lock().unwrap().insert(user_id, user);
            self.creds.lock().unwrap().insert(user_id, Credentials { user_id, password_hash });
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let wanted = username.trim().to_lowercase();
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.username.as_deref().map(str::to_lowercase) == Some(wanted.clone())).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let wanted = email.trim().to_lowercase();
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.email == wanted).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn set_password(&self, user_id: Uuid, password_hash: String) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            let user = users.get_mut(&user_id).ok_or(AuthError::NotFound)?;
            user.jwt_id = Uuid::new_v4();
            self.creds.lock().unwrap().insert(user_id, Credentials { user_id, password_hash });
            Ok(user.clone())
        }

        async fn record_login(&self, _user_id: Uuid) -> Result<(), AuthError> { Ok(()) }
    }
}
