//! Read views returned to API clients.

use chrono::{DateTime, FixedOffset};
use models::user::GeoPoint;
use models::{haircut, haircut_image, photo_user, user};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as Json;
use uuid::Uuid;

use crate::storage::BlobStore;

#[derive(Debug, Clone, Serialize)]
pub struct HairCutImageView {
    pub id: Uuid,
    pub image: Option<String>,
    pub default: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HairCutView {
    pub id: Uuid,
    pub code: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub minutes: i32,
    pub is_active: bool,
    pub images: Vec<HairCutImageView>,
    /// URLs of the images, default first.
    pub images_display: Vec<String>,
    pub created: DateTime<FixedOffset>,
    pub updated: DateTime<FixedOffset>,
}

impl HairCutView {
    pub fn build(cut: haircut::Model, images: Vec<haircut_image::Model>, store: &dyn BlobStore) -> Self {
        let images: Vec<HairCutImageView> = images
            .into_iter()
            .map(|img| HairCutImageView { id: img.id, image: img.image.as_deref().map(|k| store.url(k)), default: img.is_default })
            .collect();
        let images_display = images.iter().filter_map(|img| img.image.clone()).collect();
        HairCutView {
            id: cut.id,
            code: cut.code,
            description: cut.description,
            price: haircut::money(cut.price),
            minutes: cut.minutes,
            is_active: cut.is_active,
            images,
            images_display,
            created: cut.created,
            updated: cut.updated,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoView {
    pub id: Uuid,
    pub photo: Option<String>,
    pub created: DateTime<FixedOffset>,
}

impl PhotoView {
    pub fn build(photo: photo_user::Model, store: &dyn BlobStore) -> Self {
        PhotoView { id: photo.id, photo: photo.photo.as_deref().map(|k| store.url(k)), created: photo.created }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub direction: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub point: Option<GeoPoint>,
    pub status: i16,
    pub status_display: &'static str,
    pub is_barber: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub info: Json,
    pub last_login: Option<DateTime<FixedOffset>>,
    pub created: DateTime<FixedOffset>,
    pub updated: DateTime<FixedOffset>,
    /// URL of the current photo.
    pub photo: Option<String>,
    pub current_photo: Option<PhotoView>,
}

impl UserView {
    pub fn build(u: user::Model, current_photo: Option<photo_user::Model>, store: &dyn BlobStore) -> Self {
        let current_photo = current_photo.map(|p| PhotoView::build(p, store));
        UserView {
            full_name: u.full_name(),
            point: u.point(),
            status: u.status.code(),
            status_display: u.status.display(),
            photo: current_photo.as_ref().and_then(|p| p.photo.clone()),
            current_photo,
            id: u.id,
            username: u.username,
            email: u.email,
            name: u.name,
            last_name: u.last_name,
            direction: u.direction,
            phone: u.phone,
            about: u.about,
            is_barber: u.is_barber,
            is_superuser: u.is_superuser,
            is_active: u.is_active,
            info: u.info,
            last_login: u.last_login,
            created: u.created,
            updated: u.updated,
        }
    }
}
