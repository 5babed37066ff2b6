#![cfg(test)]
use sea_orm::DatabaseConnection;

use crate::attachments::Upload;

/// Fresh migrated in-memory database per test.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_in_memory().await
}

pub fn png(name: &str) -> Upload {
    Upload::new(name, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01".to_vec())
}

pub fn jpeg(name: &str) -> Upload {
    Upload::new(name, b"\xff\xd8\xff\xe0\0\x10JFIF\0\x01".to_vec())
}
