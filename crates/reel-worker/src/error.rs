//! Run error types.

use thiserror::Error;

use reel_media::MediaError;
use reel_models::ModelError;
use reel_publish::PublishError;
use reel_storage::StorageError;
use reel_twitch::DiscoveryError;

use crate::report::RunReport;

pub type RunResult<T> = Result<T, RunError>;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(DiscoveryError),

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Discovery failed: {0}")]
    Discovery(DiscoveryError),

    #[error("Resolve failed: {0}")]
    Resolve(MediaError),

    #[error("Download failed: {0}")]
    Download(MediaError),

    #[error("Transcode failed: {0}")]
    Transcode(MediaError),

    #[error("Upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("Publish rejected: {0}")]
    PublishRejected(PublishError),

    #[error("Publish timed out: {0}")]
    PublishTimeout(PublishError),

    #[error("Publish failed: {0}")]
    Publish(PublishError),

    #[error("Cleanup refused for clip {0}: no target confirmed")]
    CleanupRefused(usize),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl RunError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Errors that only cost the current clip.
    pub fn is_per_clip(&self) -> bool {
        matches!(
            self,
            RunError::Resolve(_) | RunError::Download(_) | RunError::Transcode(_)
        )
    }

    /// Errors that end the run.
    pub fn is_fatal(&self) -> bool {
        !self.is_per_clip()
    }

    /// Short stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Config(_) => "config",
            RunError::Auth(_) => "auth",
            RunError::GameNotFound(_) => "game_not_found",
            RunError::Discovery(_) => "discovery",
            RunError::Resolve(_) => "resolve",
            RunError::Download(_) => "download",
            RunError::Transcode(_) => "transcode",
            RunError::Upload(_) => "upload",
            RunError::PublishRejected(_) => "publish_rejected",
            RunError::PublishTimeout(_) => "publish_timeout",
            RunError::Publish(_) => "publish",
            RunError::CleanupRefused(_) => "cleanup_refused",
            RunError::Model(_) => "model",
        }
    }
}

impl From<DiscoveryError> for RunError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::GameNotFound(name) => RunError::GameNotFound(name),
            DiscoveryError::ConfigError(msg) => RunError::Config(msg),
            e if e.is_auth() => RunError::Auth(e),
            e => RunError::Discovery(e),
        }
    }
}

impl From<PublishError> for RunError {
    fn from(err: PublishError) -> Self {
        match err {
            e @ PublishError::Rejected { .. } => RunError::PublishRejected(e),
            e @ PublishError::Timeout { .. } => RunError::PublishTimeout(e),
            e => RunError::Publish(e),
        }
    }
}

/// A run-level failure, carrying everything reported before it.
#[derive(Debug, Error)]
#[error("Run aborted: {error}")]
pub struct RunAborted {
    pub report: RunReport,
    #[source]
    pub error: RunError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_publish::{PublishPhase, TargetError};
    use std::time::Duration;

    #[test]
    fn test_discovery_mapping() {
        assert!(matches!(
            RunError::from(DiscoveryError::GameNotFound("Nope".into())),
            RunError::GameNotFound(_)
        ));
        assert!(matches!(
            RunError::from(DiscoveryError::auth_error("bad secret")),
            RunError::Auth(_)
        ));
        assert!(matches!(
            RunError::from(DiscoveryError::upstream(500, "boom")),
            RunError::Discovery(_)
        ));
    }

    #[test]
    fn test_publish_mapping_keeps_timeout_distinct() {
        let timeout = RunError::from(PublishError::Timeout {
            target: "instagram".into(),
            attempts: 9,
            waited: Duration::from_secs(600),
        });
        let rejected = RunError::from(PublishError::Rejected {
            target: "instagram".into(),
            phase: PublishPhase::Publish,
            source: TargetError::http(403, None, "denied"),
        });

        assert_eq!(timeout.kind(), "publish_timeout");
        assert_eq!(rejected.kind(), "publish_rejected");
        assert!(timeout.is_fatal());
    }

    #[test]
    fn test_per_clip_classification() {
        assert!(RunError::Resolve(MediaError::resolve_failed("empty")).is_per_clip());
        assert!(RunError::Transcode(MediaError::Timeout(5)).is_per_clip());
        assert!(!RunError::Upload(StorageError::upload_failed("x")).is_per_clip());
    }

    #[test]
    fn test_step_errors_name_the_step_once() {
        let resolve = RunError::Resolve(MediaError::resolve_failed("No media URL for https://clips/a"));
        let download = RunError::Download(MediaError::download_failed("Empty body from https://media/a"));
        let timeout = RunError::Transcode(MediaError::Timeout(5));

        assert_eq!(resolve.to_string(), "Resolve failed: No media URL for https://clips/a");
        assert_eq!(download.to_string(), "Download failed: Empty body from https://media/a");
        assert_eq!(timeout.to_string(), "Transcode failed: Operation timed out after 5 seconds");
    }
}
