use std::collections::HashMap;
use std::sync::Arc;

use models::deletion::EntityKind;
use models::user::{self, GeoPoint, NewUser, UserChanges, UserFilter, UserStatus};
use models::photo_user;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::Deserialize;
use serde_json::Value as Json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::attachments::{AttachmentWriter, Upload, UserPhotos};
use crate::deletion::{DeletionEvent, DeletionHooks};
use crate::errors::ServiceError;
use crate::pagination::{Listed, Page, Pagination};
use crate::password::{hash_password, PasswordPolicy, UserAttributes};
use crate::storage::BlobStore;
use crate::upsert::UnitOfWork;
use crate::views::UserView;

/// Writable user fields as submitted by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub direction: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub point: Option<GeoPoint>,
    pub status: Option<i16>,
    pub is_barber: Option<bool>,
    pub is_superuser: Option<bool>,
    pub info: Option<Json>,
}

fn parse_status(code: Option<i16>) -> Result<Option<UserStatus>, ServiceError> {
    match code {
        None => Ok(None),
        Some(c) => UserStatus::from_code(c)
            .map(Some)
            .ok_or_else(|| ServiceError::invalid(format!("status: \"{}\" is not a valid choice.", c))),
    }
}

fn key_prefix(user_id: Uuid) -> String {
    format!("photos/{}", user_id)
}

/// User accounts and their photos.
#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    store: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
    hooks: DeletionHooks,
    policy: PasswordPolicy,
}

impl UserService {
    pub fn new(db: DatabaseConnection, store: Arc<dyn BlobStore>, max_upload_bytes: usize, hooks: DeletionHooks) -> Self {
        Self { db, store, max_upload_bytes, hooks, policy: PasswordPolicy }
    }

    fn check_password(&self, password: &str, attrs: &UserAttributes) -> Result<String, ServiceError> {
        self.policy.validate(password, attrs).map_err(ServiceError::Validation)?;
        Ok(hash_password(password)?)
    }

    /// Sign-up: validate and hash the password, insert the user and, when
    /// given, the photo, pointing `current_photo_id` at it.
    #[instrument(skip(self, input, photo), fields(has_photo = photo.is_some()))]
    pub async fn create(&self, input: UserInput, photo: Option<Upload>) -> Result<UserView, ServiceError> {
        let mut missing = Vec::new();
        if input.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
            missing.push("email: this field is required.".to_string());
        }
        if input.password.as_deref().map_or(true, str::is_empty) {
            missing.push("password: this field is required.".to_string());
        }
        if !missing.is_empty() {
            return Err(ServiceError::Validation(missing));
        }
        let email = user::normalize_email(input.email.as_deref().unwrap_or_default());
        let attrs = UserAttributes {
            username: input.username.clone(),
            email: Some(email.clone()),
            name: input.name.clone(),
            last_name: input.last_name.clone(),
        };
        let password_hash = self.check_password(input.password.as_deref().unwrap_or_default(), &attrs)?;

        let new_user = NewUser {
            username: input.username,
            email,
            name: input.name,
            last_name: input.last_name,
            password_hash,
            direction: input.direction,
            phone: input.phone,
            about: input.about,
            point: input.point,
            status: parse_status(input.status)?,
            is_barber: input.is_barber.unwrap_or(false),
            is_superuser: input.is_superuser.unwrap_or(false),
            info: input.info,
        };

        let mut uow = UnitOfWork::<UserPhotos>::begin(&self.db, self.store.as_ref(), self.max_upload_bytes).await?;
        let outcome = Self::insert_rows(&uow.txn, &mut uow.attachments, new_user, photo.as_ref()).await;
        let created = uow.finish(outcome).await?;
        info!(user_id = %created.id, "user_registered");
        self.get(created.id).await
    }

    /// Partial update. A supplied password is validated, hashed and revokes
    /// outstanding tokens; a supplied photo replaces every existing photo.
    #[instrument(skip(self, input, photo), fields(user_id = %id, has_photo = photo.is_some()))]
    pub async fn update(&self, id: Uuid, input: UserInput, photo: Option<Upload>) -> Result<UserView, ServiceError> {
        let current = user::find(&self.db, id).await?.ok_or_else(|| ServiceError::not_found("user"))?;

        let password_hash = match input.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                let attrs = UserAttributes {
                    username: input.username.clone().or(current.username.clone()),
                    email: input.email.clone().or(Some(current.email.clone())),
                    name: input.name.clone().or(current.name.clone()),
                    last_name: input.last_name.clone().or(Some(current.last_name.clone())),
                };
                Some(self.check_password(password, &attrs)?)
            }
            None => None,
        };
        let changes = UserChanges {
            username: input.username,
            email: input.email,
            name: input.name,
            last_name: input.last_name,
            password_hash,
            direction: input.direction,
            phone: input.phone,
            about: input.about,
            point: input.point,
            status: parse_status(input.status)?,
            is_barber: input.is_barber,
            is_superuser: input.is_superuser,
            info: input.info,
        };

        let mut uow = UnitOfWork::<UserPhotos>::begin(&self.db, self.store.as_ref(), self.max_upload_bytes).await?;
        let outcome = Self::update_rows(&uow.txn, &mut uow.attachments, id, changes, photo.as_ref()).await;
        uow.finish(outcome).await?;
        info!(user_id = %id, "user_updated");
        self.get(id).await
    }

    async fn insert_rows(
        txn: &DatabaseTransaction,
        attachments: &mut AttachmentWriter<'_, UserPhotos>,
        new_user: NewUser,
        photo: Option<&Upload>,
    ) -> Result<user::Model, ServiceError> {
        let created = user::create(txn, new_user).await?;
        let Some(upload) = photo else { return Ok(created) };
        let rows = attachments.write_all(txn, created.id, &key_prefix(created.id), std::slice::from_ref(upload)).await?;
        match rows.first() {
            Some(row) => Ok(user::set_current_photo(txn, created.id, Some(row.id)).await?),
            None => Ok(created),
        }
    }

    async fn update_rows(
        txn: &DatabaseTransaction,
        attachments: &mut AttachmentWriter<'_, UserPhotos>,
        id: Uuid,
        changes: UserChanges,
        photo: Option<&Upload>,
    ) -> Result<user::Model, ServiceError> {
        let updated = user::update(txn, id, changes).await?;
        let Some(upload) = photo else { return Ok(updated) };
        let replaced = attachments.replace_all(txn, id, &key_prefix(id), std::slice::from_ref(upload)).await?;
        match replaced.as_deref().and_then(|rows| rows.first()) {
            Some(row) => Ok(user::set_current_photo(txn, id, Some(row.id)).await?),
            None => Ok(updated),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<UserView, ServiceError> {
        let found = user::find(&self.db, id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        let photo = match found.current_photo_id {
            Some(photo_id) => photo_user::find(&self.db, photo_id).await?,
            None => None,
        };
        Ok(UserView::build(found, photo, self.store.as_ref()))
    }

    pub async fn list(&self, filter: &UserFilter, paging: Option<Pagination>) -> Result<Listed<UserView>, ServiceError> {
        match paging {
            None => {
                let rows = user::list(&self.db, filter).await?;
                Ok(Listed::All(self.with_photos(rows).await?))
            }
            Some(p) => {
                let (page_idx, per_page) = p.normalize();
                let (rows, count) = user::list_page(&self.db, filter, page_idx, per_page).await?;
                let results = self.with_photos(rows).await?;
                Ok(Listed::Paged(Page { count, page: page_idx + 1, per_page, results }))
            }
        }
    }

    async fn with_photos(&self, rows: Vec<user::Model>) -> Result<Vec<UserView>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().filter_map(|u| u.current_photo_id).collect();
        let mut photos: HashMap<Uuid, photo_user::Model> =
            photo_user::find_many(&self.db, &ids).await?.into_iter().map(|p| (p.id, p)).collect();
        Ok(rows
            .into_iter()
            .map(|u| {
                let photo = u.current_photo_id.and_then(|pid| photos.remove(&pid));
                UserView::build(u, photo, self.store.as_ref())
            })
            .collect())
    }

    /// Soft delete: status becomes inactive and the row stays. The token
    /// nonce is rotated so tokens issued before the delete stop working.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if user::find(&self.db, id).await?.is_none() {
            return Err(ServiceError::not_found("user"));
        }
        let event = DeletionEvent::new(EntityKind::User, id);
        self.hooks.before_delete(&event).await?;
        let txn = self.db.begin().await?;
        user::soft_delete(&txn, id).await?;
        user::rotate_jwt_id(&txn, id).await?;
        txn.commit().await?;
        self.hooks.after_delete(&event).await;
        Ok(())
    }
}
