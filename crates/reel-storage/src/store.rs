//! Staging seam used by the orchestrator.

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use reel_models::StagedMedia;

use crate::client::{content_type_for, S3Staging};
use crate::error::StorageResult;

/// Places a local file at a URL the publish targets can fetch.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Key prefix to stage under.
    fn prefix(&self) -> &str;

    /// Upload `local` at `key` and return its public URL.
    async fn stage(&self, local: &Path, key: &str) -> StorageResult<StagedMedia>;

    /// Delete a staged object.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

#[async_trait]
impl StagingStore for S3Staging {
    fn prefix(&self) -> &str {
        S3Staging::prefix(self)
    }

    async fn stage(&self, local: &Path, key: &str) -> StorageResult<StagedMedia> {
        self.upload_file(local, key, content_type_for(local)).await?;
        let url = self.presign_get(key, self.link_ttl()).await?;

        info!(key = %key, ttl_secs = self.link_ttl().as_secs(), "Staged reel");
        Ok(StagedMedia {
            key: key.to_string(),
            url,
        })
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.delete_object(key).await
    }
}
