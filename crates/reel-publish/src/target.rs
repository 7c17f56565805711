//! Publish target seam.

use async_trait::async_trait;

use crate::error::{TargetError, TargetResult};

/// One platform's half of the two-phase publish protocol.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    /// Stable name used in logs, metrics and receipts.
    fn name(&self) -> &str;

    /// Submit the staged media URL and return the container ID.
    async fn create_container(&self, media_url: &str) -> TargetResult<String>;

    /// Finalize a container. Returns the published media ID when the
    /// platform reports one.
    async fn publish_container(&self, container_id: &str) -> TargetResult<Option<String>>;

    /// Whether `error` means "still processing, try again later".
    fn is_not_ready(&self, error: &TargetError) -> bool;
}
