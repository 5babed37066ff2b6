use std::collections::HashMap;
use std::sync::Arc;

use models::deletion::EntityKind;
use models::haircut::{self, HairCutFields, HairCutFilter};
use models::haircut_image;
use sea_orm::{DatabaseConnection, DatabaseTransaction};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::attachments::{sanitize_segment, AttachmentWriter, HairCutImages, Upload};
use crate::deletion::{DeletionEvent, DeletionHooks};
use crate::errors::ServiceError;
use crate::pagination::{Listed, Page, Pagination};
use crate::storage::BlobStore;
use crate::upsert::UnitOfWork;
use crate::views::HairCutView;

/// Haircut offerings and their images.
#[derive(Clone)]
pub struct HairCutService {
    db: DatabaseConnection,
    store: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
    hooks: DeletionHooks,
}

fn key_prefix(cut: &haircut::Model) -> String {
    let owner = cut.code.as_deref().map(sanitize_segment).unwrap_or_else(|| cut.id.to_string());
    format!("img/haircut/{}", owner)
}

impl HairCutService {
    pub fn new(db: DatabaseConnection, store: Arc<dyn BlobStore>, max_upload_bytes: usize, hooks: DeletionHooks) -> Self {
        Self { db, store, max_upload_bytes, hooks }
    }

    /// Insert a haircut and one image row per upload, atomically.
    #[instrument(skip(self, input, uploads), fields(images = uploads.len()))]
    pub async fn create(&self, input: HairCutFields, uploads: Vec<Upload>) -> Result<HairCutView, ServiceError> {
        let mut uow = UnitOfWork::<HairCutImages>::begin(&self.db, self.store.as_ref(), self.max_upload_bytes).await?;
        let outcome = Self::insert_rows(&uow.txn, &mut uow.attachments, &input, &uploads).await;
        let created = uow.finish(outcome).await?;
        info!(haircut_id = %created.id, "haircut_created");
        self.get(created.id).await
    }

    /// Update fields; a non-empty `uploads` set replaces every image.
    #[instrument(skip(self, input, uploads), fields(haircut_id = %id))]
    pub async fn update(&self, id: Uuid, input: HairCutFields, uploads: Option<Vec<Upload>>) -> Result<HairCutView, ServiceError> {
        let uploads = uploads.unwrap_or_default();
        let mut uow = UnitOfWork::<HairCutImages>::begin(&self.db, self.store.as_ref(), self.max_upload_bytes).await?;
        let outcome = Self::update_rows(&uow.txn, &mut uow.attachments, id, &input, &uploads).await;
        uow.finish(outcome).await?;
        info!(haircut_id = %id, replaced_images = !uploads.is_empty(), "haircut_updated");
        self.get(id).await
    }

    async fn insert_rows(
        txn: &DatabaseTransaction,
        attachments: &mut AttachmentWriter<'_, HairCutImages>,
        fields: &HairCutFields,
        uploads: &[Upload],
    ) -> Result<haircut::Model, ServiceError> {
        let created = haircut::create(txn, fields).await?;
        attachments.write_all(txn, created.id, &key_prefix(&created), uploads).await?;
        Ok(created)
    }

    async fn update_rows(
        txn: &DatabaseTransaction,
        attachments: &mut AttachmentWriter<'_, HairCutImages>,
        id: Uuid,
        fields: &HairCutFields,
        uploads: &[Upload],
    ) -> Result<haircut::Model, ServiceError> {
        let updated = haircut::update(txn, id, fields).await?;
        attachments.replace_all(txn, id, &key_prefix(&updated), uploads).await?;
        Ok(updated)
    }

    pub async fn get(&self, id: Uuid) -> Result<HairCutView, ServiceError> {
        let (cut, images) = haircut::find_with_images(&self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("haircut"))?;
        Ok(HairCutView::build(cut, images, self.store.as_ref()))
    }

    /// Filtered listing; `None` paging returns every match.
    pub async fn list(&self, filter: &HairCutFilter, paging: Option<Pagination>) -> Result<Listed<HairCutView>, ServiceError> {
        match paging {
            None => {
                let rows = haircut::list(&self.db, filter).await?;
                Ok(Listed::All(self.with_images(rows).await?))
            }
            Some(p) => {
                let (page_idx, per_page) = p.normalize();
                let (rows, count) = haircut::list_page(&self.db, filter, page_idx, per_page).await?;
                let results = self.with_images(rows).await?;
                Ok(Listed::Paged(Page { count, page: page_idx + 1, per_page, results }))
            }
        }
    }

    async fn with_images(&self, rows: Vec<haircut::Model>) -> Result<Vec<HairCutView>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut grouped: HashMap<Uuid, Vec<haircut_image::Model>> = HashMap::new();
        for img in haircut_image::for_haircuts(&self.db, &ids).await? {
            grouped.entry(img.haircut_id).or_default().push(img);
        }
        Ok(rows
            .into_iter()
            .map(|cut| {
                let images = grouped.remove(&cut.id).unwrap_or_default();
                HairCutView::build(cut, images, self.store.as_ref())
            })
            .collect())
    }

    /// Hard delete; image rows cascade and their blobs are removed.
    #[instrument(skip(self), fields(haircut_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let (_, images) = haircut::find_with_images(&self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("haircut"))?;
        let event = DeletionEvent::new(EntityKind::HairCut, id);
        self.hooks.before_delete(&event).await?;
        haircut::delete(&self.db, id).await?;
        for key in images.into_iter().filter_map(|img| img.image) {
            if let Err(e) = self.store.remove(&key).await {
                warn!(key = %key, error = %e, "attachment_cleanup_failed");
            }
        }
        self.hooks.after_delete(&event).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deletion::recording::RecordingObserver;
    use crate::storage::MemoryBlobStore;
    use crate::test_support::{get_db, jpeg, png};
    use rust_decimal::Decimal;
    use sea_orm::EntityTrait;
    use std::str::FromStr;

    async fn setup() -> anyhow::Result<(HairCutService, Arc<MemoryBlobStore>, Arc<RecordingObserver>, DatabaseConnection)> {
        let db = get_db().await?;
        let store = Arc::new(MemoryBlobStore::new("/media"));
        let recorder = Arc::new(RecordingObserver::default());
        let hooks = DeletionHooks::with_tracing().register(recorder.clone());
        let svc = HairCutService::new(db.clone(), store.clone(), 1024 * 1024, hooks);
        Ok((svc, store, recorder, db))
    }

    fn fade() -> HairCutFields {
        HairCutFields {
            description: Some("Fade".into()),
            price: Some(Decimal::from_str("15.00").unwrap()),
            minutes: Some(20),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_with_two_images() -> anyhow::Result<()> {
        let (svc, store, _, _) = setup().await?;
        let view = svc.create(fade(), vec![png("a.png"), jpeg("b.jpg")]).await?;
        assert_eq!(view.images.len(), 2);
        assert_eq!(view.images_display.len(), 2);
        assert!(view.images[0].default);
        assert!(!view.images[1].default);
        assert_eq!(view.price.to_string(), "15.00");
        assert_eq!(store.len().await, 2);

        let fetched = svc.get(view.id).await?;
        assert_eq!(fetched.images.len(), 2);
        assert!(fetched.images_display.iter().all(|u| u.starts_with("/media/img/haircut/")));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_image_rolls_back_everything() -> anyhow::Result<()> {
        let (svc, store, _, db) = setup().await?;
        let bad = Upload::new("notes.txt", b"not an image".to_vec());
        let err = svc.create(fade(), vec![png("a.png"), bad]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert!(haircut::Entity::find().all(&db).await?.is_empty());
        assert!(haircut_image::Entity::find().all(&db).await?.is_empty());
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_description_is_a_validation_error() -> anyhow::Result<()> {
        let (svc, store, _, _) = setup().await?;
        svc.create(fade(), vec![]).await?;
        let err = svc.create(fade(), vec![png("a.png")]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_image_set() -> anyhow::Result<()> {
        let (svc, store, _, _) = setup().await?;
        let created = svc.create(fade(), vec![png("a.png"), png("b.png")]).await?;
        let original: Vec<Uuid> = created.images.iter().map(|i| i.id).collect();

        let updated = svc.update(created.id, HairCutFields::default(), Some(vec![jpeg("c.jpg")])).await?;
        assert_eq!(updated.images.len(), 1);
        assert!(!original.contains(&updated.images[0].id));
        assert!(updated.images[0].default);
        // superseded blobs are gone
        let url = updated.images_display[0].clone();
        let key = url.strip_prefix("/media/").expect("media url");
        assert_eq!(store.keys().await, vec![key.to_string()]);
        assert_eq!(store.get(key).await, Some(jpeg("c.jpg").bytes));
        Ok(())
    }

    #[tokio::test]
    async fn update_without_images_keeps_existing() -> anyhow::Result<()> {
        let (svc, _, _, _) = setup().await?;
        let created = svc.create(fade(), vec![png("a.png"), png("b.png")]).await?;
        let before: Vec<Uuid> = created.images.iter().map(|i| i.id).collect();

        let fields = HairCutFields { minutes: Some(25), ..Default::default() };
        let updated = svc.update(created.id, fields.clone(), None).await?;
        assert_eq!(updated.minutes, 25);
        assert_eq!(updated.images.iter().map(|i| i.id).collect::<Vec<_>>(), before);

        let again = svc.update(created.id, fields, Some(vec![])).await?;
        assert_eq!(again.images.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn failed_replacement_keeps_original_images() -> anyhow::Result<()> {
        let (svc, store, _, _) = setup().await?;
        let created = svc.create(fade(), vec![png("a.png")]).await?;
        let bad = Upload::new("b.bin", vec![0u8; 16]);
        let err = svc.update(created.id, HairCutFields::default(), Some(vec![png("ok.png"), bad])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let fetched = svc.get(created.id).await?;
        assert_eq!(fetched.images.len(), 1);
        assert_eq!(fetched.images[0].id, created.images[0].id);
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn list_pages_and_search() -> anyhow::Result<()> {
        let (svc, _, _, _) = setup().await?;
        svc.create(fade(), vec![png("a.png")]).await?;
        svc.create(HairCutFields { description: Some("Beard".into()), minutes: Some(45), ..Default::default() }, vec![])
            .await?;

        let all = svc.list(&HairCutFilter::default(), None).await?;
        assert!(matches!(all, Listed::All(ref items) if items.len() == 2));

        let paged = svc.list(&HairCutFilter::default(), Some(Pagination { page: 1, per_page: 1 })).await?;
        match paged {
            Listed::Paged(page) => {
                assert_eq!(page.count, 2);
                assert_eq!(page.results.len(), 1);
                assert_eq!(page.page, 1);
            }
            Listed::All(_) => panic!("expected a page"),
        }

        let found = svc.list(&HairCutFilter { search: Some("fade".into()), ..Default::default() }, None).await?;
        let items = found.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].images.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_and_notifies_observers() -> anyhow::Result<()> {
        let (svc, store, recorder, db) = setup().await?;
        let created = svc.create(fade(), vec![png("a.png"), png("b.png")]).await?;
        svc.delete(created.id).await?;

        assert!(haircut_image::Entity::find().all(&db).await?.is_empty());
        assert!(store.is_empty().await);
        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events.iter().map(|(phase, _)| *phase).collect::<Vec<_>>(), vec!["before", "after"]);
        assert!(events.iter().all(|(_, e)| e.kind == EntityKind::HairCut && e.id == created.id));

        assert!(matches!(svc.delete(created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
