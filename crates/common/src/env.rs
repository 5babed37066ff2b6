//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the media root exists (attachments are written below it).
pub async fn ensure_env(media_root: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(media_root).await.is_err() {
        warn!(%media_root, "media directory not found; creating it");
    }
    tokio::fs::create_dir_all(media_root)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {media_root}: {e}"))?;
    info!(%media_root, "media directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_env;

    #[tokio::test]
    async fn creates_missing_media_root() {
        let dir = std::env::temp_dir().join(format!("barbershop-env-{}", std::process::id()));
        let path = dir.join("media");
        let path_str = path.to_string_lossy().to_string();
        ensure_env(&path_str).await.unwrap();
        assert!(tokio::fs::metadata(&path).await.unwrap().is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
