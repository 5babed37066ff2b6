//! Attachment writer shared by haircut images and user photos.
//!
//! Rows are written inside the caller's transaction; blobs go to the
//! `BlobStore` first. The writer remembers every key it stored and every key
//! whose row it removed so the unit of work can clean up after commit or
//! rollback.

use std::marker::PhantomData;

use async_trait::async_trait;
use image::ImageFormat;
use models::errors::ModelError;
use models::{haircut_image, photo_user};
use sea_orm::DatabaseTransaction;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::BlobStore;

/// Raw uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { file_name: file_name.into(), bytes: bytes.into() }
    }
}

/// An attachment table owned by a parent row.
#[async_trait]
pub trait AttachmentKind: Send + Sync {
    type Row: Send;
    /// Field name used in validation messages.
    const LABEL: &'static str;

    async fn insert_row(txn: &DatabaseTransaction, parent_id: Uuid, path: &str, position: usize) -> Result<Self::Row, ModelError>;
    /// Delete every row of the parent, returning the stored keys.
    async fn remove_rows(txn: &DatabaseTransaction, parent_id: Uuid) -> Result<Vec<String>, ModelError>;
    fn row_id(row: &Self::Row) -> Uuid;
}

pub struct HairCutImages;

#[async_trait]
impl AttachmentKind for HairCutImages {
    type Row = haircut_image::Model;
    const LABEL: &'static str = "images";

    async fn insert_row(txn: &DatabaseTransaction, parent_id: Uuid, path: &str, position: usize) -> Result<Self::Row, ModelError> {
        haircut_image::insert(txn, parent_id, path, position == 0).await
    }

    async fn remove_rows(txn: &DatabaseTransaction, parent_id: Uuid) -> Result<Vec<String>, ModelError> {
        let removed = haircut_image::delete_for_haircut(txn, parent_id).await?;
        Ok(removed.into_iter().filter_map(|row| row.image).collect())
    }

    fn row_id(row: &Self::Row) -> Uuid { row.id }
}

pub struct UserPhotos;

#[async_trait]
impl AttachmentKind for UserPhotos {
    type Row = photo_user::Model;
    const LABEL: &'static str = "photo";

    async fn insert_row(txn: &DatabaseTransaction, parent_id: Uuid, path: &str, _position: usize) -> Result<Self::Row, ModelError> {
        photo_user::insert(txn, parent_id, path).await
    }

    async fn remove_rows(txn: &DatabaseTransaction, parent_id: Uuid) -> Result<Vec<String>, ModelError> {
        let removed = photo_user::delete_for_user(txn, parent_id).await?;
        Ok(removed.into_iter().filter_map(|row| row.photo).collect())
    }

    fn row_id(row: &Self::Row) -> Uuid { row.id }
}

/// File extension for an accepted image payload.
pub fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpg"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::WebP => Some("webp"),
        ImageFormat::Bmp => Some("bmp"),
        _ => None,
    }
}

/// Check one payload and return the extension to store it under.
pub fn validate_upload(label: &str, upload: &Upload, max_bytes: usize) -> Result<&'static str, ServiceError> {
    if upload.bytes.is_empty() {
        return Err(ServiceError::invalid(format!("{}: the submitted file is empty.", label)));
    }
    if upload.bytes.len() > max_bytes {
        return Err(ServiceError::invalid(format!(
            "{}: file {} exceeds the {} byte limit.",
            label, upload.file_name, max_bytes
        )));
    }
    image_extension(&upload.bytes).ok_or_else(|| {
        ServiceError::invalid(format!(
            "{}: upload a valid image. The file you uploaded was either not an image or a corrupted image.",
            label
        ))
    })
}

/// Keep storage path segments to `[A-Za-z0-9_-]`.
pub fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "_".to_string() } else { cleaned }
}

pub struct AttachmentWriter<'a, K: AttachmentKind> {
    store: &'a dyn BlobStore,
    max_bytes: usize,
    written: Vec<String>,
    superseded: Vec<String>,
    _kind: PhantomData<K>,
}

impl<'a, K: AttachmentKind> AttachmentWriter<'a, K> {
    pub fn new(store: &'a dyn BlobStore, max_bytes: usize) -> Self {
        Self { store, max_bytes, written: Vec::new(), superseded: Vec::new(), _kind: PhantomData }
    }

    /// Store each payload and insert one row per payload, in order.
    pub async fn write_all(
        &mut self,
        txn: &DatabaseTransaction,
        parent_id: Uuid,
        prefix: &str,
        uploads: &[Upload],
    ) -> Result<Vec<K::Row>, ServiceError> {
        let mut rows = Vec::with_capacity(uploads.len());
        for (position, upload) in uploads.iter().enumerate() {
            let ext = validate_upload(K::LABEL, upload, self.max_bytes)?;
            let key = format!("{}/{}.{}", prefix, Uuid::new_v4(), ext);
            self.store.put(&key, &upload.bytes).await?;
            self.written.push(key.clone());
            let row = K::insert_row(txn, parent_id, &key, position).await?;
            debug!(parent_id = %parent_id, row_id = %K::row_id(&row), key = %key, "attachment_written");
            rows.push(row);
        }
        Ok(rows)
    }

    /// Replace the parent's whole attachment set. An empty set leaves the
    /// existing rows untouched and yields `None`.
    pub async fn replace_all(
        &mut self,
        txn: &DatabaseTransaction,
        parent_id: Uuid,
        prefix: &str,
        uploads: &[Upload],
    ) -> Result<Option<Vec<K::Row>>, ServiceError> {
        if uploads.is_empty() {
            return Ok(None);
        }
        let removed = K::remove_rows(txn, parent_id).await?;
        self.superseded.extend(removed);
        self.write_all(txn, parent_id, prefix, uploads).await.map(Some)
    }

    /// Delete blobs of rows removed by a committed replacement.
    pub(crate) async fn discard_superseded(&mut self) {
        let keys = std::mem::take(&mut self.superseded);
        self.remove_keys(keys).await;
    }

    /// Delete blobs written by a call whose transaction rolled back.
    pub(crate) async fn discard_written(&mut self) {
        let keys = std::mem::take(&mut self.written);
        self.remove_keys(keys).await;
    }

    async fn remove_keys(&self, keys: Vec<String>) {
        for key in keys {
            if let Err(e) = self.store.remove(&key).await {
                warn!(key = %key, error = %e, "attachment_cleanup_failed");
            }
        }
    }
}
