//! Pre/post delete observers.

use std::sync::Arc;

use async_trait::async_trait;
use models::deletion::{DeletionPolicy, EntityKind};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionEvent {
    pub kind: EntityKind,
    pub id: Uuid,
    pub policy: DeletionPolicy,
}

impl DeletionEvent {
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id, policy: kind.deletion_policy() }
    }
}

#[async_trait]
pub trait DeletionObserver: Send + Sync {
    /// An error aborts the deletion.
    async fn before_delete(&self, _event: &DeletionEvent) -> Result<(), ServiceError> { Ok(()) }
    async fn after_delete(&self, _event: &DeletionEvent) {}
}

/// Logs every deletion.
pub struct TracingObserver;

#[async_trait]
impl DeletionObserver for TracingObserver {
    async fn before_delete(&self, event: &DeletionEvent) -> Result<(), ServiceError> {
        info!(entity = event.kind.table_name(), id = %event.id, policy = ?event.policy, "delete_requested");
        Ok(())
    }

    async fn after_delete(&self, event: &DeletionEvent) {
        info!(entity = event.kind.table_name(), id = %event.id, policy = ?event.policy, "deleted");
    }
}

#[derive(Clone, Default)]
pub struct DeletionHooks {
    observers: Vec<Arc<dyn DeletionObserver>>,
}

impl DeletionHooks {
    /// Registry with the tracing observer installed.
    pub fn with_tracing() -> Self {
        Self::default().register(Arc::new(TracingObserver))
    }

    pub fn register(mut self, observer: Arc<dyn DeletionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub async fn before_delete(&self, event: &DeletionEvent) -> Result<(), ServiceError> {
        for observer in &self.observers {
            observer.before_delete(event).await?;
        }
        Ok(())
    }

    pub async fn after_delete(&self, event: &DeletionEvent) {
        for observer in &self.observers {
            observer.after_delete(event).await;
        }
    }
}
