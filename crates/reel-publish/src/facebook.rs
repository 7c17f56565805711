//! Facebook Page Reels via the `video_reels` hosted-file flow.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::error::{TargetError, TargetResult};
use crate::graph::{id_field, parse_codes, GraphClient, NotReadyRule, DEFAULT_GRAPH_API_URL};
use crate::target::PublishTarget;

/// Graph error code for "video is still being processed".
pub const VIDEO_PROCESSING_CODE: i64 = 6000;

/// Configuration for the Facebook target.
#[derive(Debug, Clone)]
pub struct FacebookConfig {
    pub page_access_token: String,
    pub page_id: String,
    pub graph_api_url: String,
    /// Graph error codes on a 400 that mean "not ready yet"
    pub not_ready_codes: Vec<i64>,
    pub timeout: Duration,
}

impl FacebookConfig {
    /// Create config from environment variables.
    pub fn from_env() -> TargetResult<Self> {
        let not_ready_codes = match std::env::var("FACEBOOK_NOT_READY_CODES") {
            Ok(raw) => parse_codes("FACEBOOK_NOT_READY_CODES", &raw)?,
            Err(_) => vec![VIDEO_PROCESSING_CODE],
        };

        Ok(Self {
            page_access_token: std::env::var("FACEBOOK_PAGE_ACCESS_TOKEN")
                .map_err(|_| TargetError::config_error("FACEBOOK_PAGE_ACCESS_TOKEN not set"))?,
            page_id: std::env::var("FACEBOOK_PAGE_ID")
                .map_err(|_| TargetError::config_error("FACEBOOK_PAGE_ID not set"))?,
            graph_api_url: std::env::var("GRAPH_API_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_API_URL.to_string()),
            not_ready_codes,
            timeout: Duration::from_secs(60),
        })
    }
}

/// Facebook Page Reels publish target.
///
/// The create phase opens an upload session and points it at the staged
/// URL; the publish phase finishes the session with `video_state=PUBLISHED`.
pub struct FacebookReels {
    graph: GraphClient,
    config: FacebookConfig,
    not_ready: NotReadyRule,
}

impl FacebookReels {
    pub const NAME: &'static str = "facebook";

    pub fn new(config: FacebookConfig) -> TargetResult<Self> {
        Ok(Self {
            graph: GraphClient::new(&config.graph_api_url, config.timeout)?,
            not_ready: NotReadyRule::status_with_codes(400, config.not_ready_codes.clone()),
            config,
        })
    }

    pub fn from_env() -> TargetResult<Self> {
        Self::new(FacebookConfig::from_env()?)
    }

    fn reels_path(&self) -> String {
        format!("{}/video_reels", self.config.page_id)
    }
}

#[async_trait]
impl PublishTarget for FacebookReels {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn create_container(&self, media_url: &str) -> TargetResult<String> {
        let session = self
            .graph
            .post(
                &self.reels_path(),
                &[
                    ("upload_phase", "start"),
                    ("access_token", self.config.page_access_token.as_str()),
                ],
            )
            .await?;

        let video_id = id_field(&session, "video_id")?;
        let upload_url = id_field(&session, "upload_url")?;

        let auth = format!("OAuth {}", self.config.page_access_token);
        let upload = self
            .graph
            .post_absolute(&upload_url, &[("Authorization", auth.as_str()), ("file_url", media_url)])
            .await?;

        if upload.get("success").and_then(|v| v.as_bool()) != Some(true) {
            return Err(TargetError::MissingField("success"));
        }

        info!(video_id = %video_id, "Created Facebook reel upload session");
        Ok(video_id)
    }

    async fn publish_container(&self, container_id: &str) -> TargetResult<Option<String>> {
        let body = self
            .graph
            .post(
                &self.reels_path(),
                &[
                    ("upload_phase", "finish"),
                    ("video_id", container_id),
                    ("video_state", "PUBLISHED"),
                    ("access_token", self.config.page_access_token.as_str()),
                ],
            )
            .await?;

        if body.get("success").and_then(|v| v.as_bool()) != Some(true) {
            return Err(TargetError::MissingField("success"));
        }

        // The reel keeps the upload session's video ID
        Ok(Some(container_id.to_string()))
    }

    fn is_not_ready(&self, error: &TargetError) -> bool {
        self.not_ready.matches(error)
    }
}
