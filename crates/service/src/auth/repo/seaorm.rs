use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::errors::ModelError;
use models::user;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn repo_err(e: ModelError) -> AuthError {
    match e {
        ModelError::NotFound(_) => AuthError::NotFound,
        other => AuthError::Repository(other.to_string()),
    }
}

impl From<user::Model> for AuthUser {
    fn from(u: user::Model) -> Self {
        AuthUser {
            id: u.id,
            full_name: u.full_name(),
            active: u.can_authenticate(),
            username: u.username,
            email: u.email,
            is_barber: u.is_barber,
            is_superuser: u.is_superuser,
            info: u.info,
            jwt_id: u.jwt_id,
        }
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_username(&self.db, username).await.map_err(repo_err)?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_email(&self.db, email).await.map_err(repo_err)?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find(&self.db, id).await.map_err(repo_err)?;
        Ok(res.map(AuthUser::from))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user::find(&self.db, user_id).await.map_err(repo_err)?;
        Ok(res.map(|u| Credentials { user_id: u.id, password_hash: u.password }))
    }

    async fn set_password(&self, user_id: Uuid, password_hash: String) -> Result<AuthUser, AuthError> {
        let updated = user::set_password(&self.db, user_id, &password_hash).await.map_err(repo_err)?;
        Ok(updated.into())
    }

    async fn record_login(&self, user_id: Uuid) -> Result<(), AuthError> {
        user::touch_last_login(&self.db, user_id).await.map_err(repo_err)
    }
}
