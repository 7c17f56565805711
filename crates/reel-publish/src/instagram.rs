//! Instagram Reels via the Graph API content publishing flow.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::error::{TargetError, TargetResult};
use crate::graph::{id_field, parse_codes, GraphClient, NotReadyRule, DEFAULT_GRAPH_API_URL};
use crate::target::PublishTarget;

/// Graph error code for "Media ID is not available" (container still processing).
pub const MEDIA_NOT_READY_CODE: i64 = 9007;

/// Configuration for the Instagram target.
#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub access_token: String,
    /// Instagram professional account ID
    pub user_id: String,
    pub graph_api_url: String,
    /// Graph error codes on a 400 that mean "not ready yet"
    pub not_ready_codes: Vec<i64>,
    pub timeout: Duration,
}

impl InstagramConfig {
    /// Create config from environment variables.
    pub fn from_env() -> TargetResult<Self> {
        let not_ready_codes = match std::env::var("INSTAGRAM_NOT_READY_CODES") {
            Ok(raw) => parse_codes("INSTAGRAM_NOT_READY_CODES", &raw)?,
            Err(_) => vec![MEDIA_NOT_READY_CODE],
        };

        Ok(Self {
            access_token: std::env::var("INSTAGRAM_ACCESS_TOKEN")
                .map_err(|_| TargetError::config_error("INSTAGRAM_ACCESS_TOKEN not set"))?,
            user_id: std::env::var("INSTAGRAM_USER_ID")
                .map_err(|_| TargetError::config_error("INSTAGRAM_USER_ID not set"))?,
            graph_api_url: std::env::var("GRAPH_API_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_API_URL.to_string()),
            not_ready_codes,
            timeout: Duration::from_secs(60),
        })
    }
}

/// Instagram Reels publish target.
///
/// A 400 from `media_publish` carrying one of the configured Graph codes
/// means "container not finished"; any other failure is a rejection.
pub struct InstagramReels {
    graph: GraphClient,
    config: InstagramConfig,
    not_ready: NotReadyRule,
}

impl InstagramReels {
    pub const NAME: &'static str = "instagram";

    pub fn new(config: InstagramConfig) -> TargetResult<Self> {
        Ok(Self {
            graph: GraphClient::new(&config.graph_api_url, config.timeout)?,
            not_ready: NotReadyRule::status_with_codes(400, config.not_ready_codes.clone()),
            config,
        })
    }

    pub fn from_env() -> TargetResult<Self> {
        Self::new(InstagramConfig::from_env()?)
    }
}

#[async_trait]
impl PublishTarget for InstagramReels {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn create_container(&self, media_url: &str) -> TargetResult<String> {
        let body = self
            .graph
            .post(
                &format!("{}/media", self.config.user_id),
                &[
                    ("video_url", media_url),
                    ("media_type", "REELS"),
                    ("access_token", self.config.access_token.as_str()),
                ],
            )
            .await?;

        let container_id = id_field(&body, "id")?;
        info!(container_id = %container_id, "Created Instagram media container");
        Ok(container_id)
    }

    async fn publish_container(&self, container_id: &str) -> TargetResult<Option<String>> {
        let body = self
            .graph
            .post(
                &format!("{}/media_publish", self.config.user_id),
                &[
                    ("creation_id", container_id),
                    ("access_token", self.config.access_token.as_str()),
                ],
            )
            .await?;

        Ok(Some(id_field(&body, "id")?))
    }

    fn is_not_ready(&self, error: &TargetError) -> bool {
        self.not_ready.matches(error)
    }
}
