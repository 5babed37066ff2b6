//! Transactional upsert: parent row plus attachment set as one unit.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{error, warn};

use crate::attachments::{AttachmentKind, AttachmentWriter};
use crate::errors::ServiceError;
use crate::storage::BlobStore;

pub struct UnitOfWork<'a, K: AttachmentKind> {
    pub txn: DatabaseTransaction,
    pub attachments: AttachmentWriter<'a, K>,
}

impl<'a, K: AttachmentKind> UnitOfWork<'a, K> {
    pub async fn begin(db: &DatabaseConnection, store: &'a dyn BlobStore, max_bytes: usize) -> Result<Self, ServiceError> {
        let txn = db.begin().await?;
        Ok(Self { txn, attachments: AttachmentWriter::new(store, max_bytes) })
    }

    /// Commit on `Ok`, roll back on `Err`. Blobs written during a failed call
    /// are removed; blobs replaced by a committed call are removed after
    /// commit.
    pub async fn finish<T>(self, outcome: Result<T, ServiceError>) -> Result<T, ServiceError> {
        let UnitOfWork { txn, mut attachments } = self;
        match outcome {
            Ok(value) => match txn.commit().await {
                Ok(()) => {
                    attachments.discard_superseded().await;
                    Ok(value)
                }
                Err(e) => {
                    error!(error = %e, "commit_failed");
                    attachments.discard_written().await;
                    Err(e.into())
                }
            },
            Err(e) => {
                if let Err(rb) = txn.rollback().await {
                    warn!(error = %rb, "rollback_failed");
                }
                attachments.discard_written().await;
                Err(e)
            }
        }
    }
}
