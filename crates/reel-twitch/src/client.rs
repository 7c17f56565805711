//! Helix API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use reel_models::{Clip, DiscoveryWindow};

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::source::ClipSource;
use crate::token_cache::TokenCache;
use crate::types::{HelixClip, HelixData, HelixGame};

/// Helix caps `first` at 100 per page.
pub const MAX_CLIPS_PER_REQUEST: u32 = 100;

/// Configuration for the Helix client.
#[derive(Debug, Clone)]
pub struct TwitchConfig {
    /// Application client ID
    pub client_id: String,
    /// Application client secret
    pub client_secret: String,
    /// OAuth2 token endpoint
    pub auth_url: String,
    /// Helix base URL
    pub api_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl TwitchConfig {
    /// Create config with the public Twitch endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: "https://id.twitch.tv/oauth2/token".to_string(),
            api_url: "https://api.twitch.tv/helix".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> DiscoveryResult<Self> {
        let client_id = std::env::var("TWITCH_CLIENT_ID")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DiscoveryError::config_error("TWITCH_CLIENT_ID not set"))?;
        let client_secret = std::env::var("TWITCH_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DiscoveryError::config_error("TWITCH_CLIENT_SECRET not set"))?;

        let mut config = Self::new(client_id, client_secret);
        if let Ok(url) = std::env::var("TWITCH_AUTH_URL") {
            config.auth_url = url;
        }
        if let Ok(url) = std::env::var("TWITCH_API_URL") {
            config.api_url = url;
        }
        Ok(config)
    }
}

/// Twitch Helix client.
pub struct HelixClient {
    http: Client,
    config: TwitchConfig,
    tokens: TokenCache,
}

impl HelixClient {
    /// Create a new Helix client. No network traffic happens until the
    /// first request.
    pub fn new(config: TwitchConfig) -> DiscoveryResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reel-twitch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DiscoveryError::Network)?;

        Ok(Self {
            http,
            config,
            tokens: TokenCache::new(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> DiscoveryResult<Self> {
        Self::new(TwitchConfig::from_env()?)
    }

    /// Resolve a game name to its Helix game ID.
    pub async fn game_id(&self, game_name: &str) -> DiscoveryResult<String> {
        let url = format!("{}/games", self.config.api_url);
        let games: HelixData<HelixGame> = self
            .get_json(&url, &[("name", game_name.to_string())])
            .await?;

        games
            .data
            .into_iter()
            .next()
            .map(|game| game.id)
            .ok_or_else(|| DiscoveryError::GameNotFound(game_name.to_string()))
    }

    /// List clips for a game ID inside a window.
    pub async fn clips(
        &self,
        game_id: &str,
        window: &DiscoveryWindow,
        first: u32,
    ) -> DiscoveryResult<Vec<HelixClip>> {
        let url = format!("{}/clips", self.config.api_url);
        let first = first.clamp(1, MAX_CLIPS_PER_REQUEST);

        let clips: HelixData<HelixClip> = self
            .get_json(
                &url,
                &[
                    ("game_id", game_id.to_string()),
                    ("first", first.to_string()),
                    ("started_at", window.started_at()),
                    ("ended_at", window.ended_at()),
                ],
            )
            .await?;

        Ok(clips.data)
    }

    /// Authenticated GET. A 401 invalidates the cached token and retries once.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> DiscoveryResult<T> {
        let token = self.tokens.get_token(&self.http, &self.config).await?;
        let mut response = self.send_get(url, query, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Twitch rejected cached token, exchanging credentials again");
            self.tokens.invalidate().await;
            let token = self.tokens.get_token(&self.http, &self.config).await?;
            response = self.send_get(url, query, &token).await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                let body = response.text().await.unwrap_or_default();
                return Err(DiscoveryError::auth_error(format!(
                    "Fresh token rejected by {}: {}",
                    url, body
                )));
            }
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::upstream(status.as_u16(), body));
        }

        Ok(response.json::<T>().await?)
    }

    async fn send_get(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> DiscoveryResult<reqwest::Response> {
        debug!("GET {}", url);
        Ok(self
            .http
            .get(url)
            .query(query)
            .header("Client-Id", &self.config.client_id)
            .bearer_auth(token)
            .send()
            .await?)
    }
}

#[async_trait]
impl ClipSource for HelixClient {
    async fn discover(
        &self,
        game_name: &str,
        window: DiscoveryWindow,
        max_count: u32,
    ) -> DiscoveryResult<Vec<Clip>> {
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let game_id = self.game_id(game_name).await?;
        let raw = self.clips(&game_id, &window, max_count).await?;

        let mut clips: Vec<Clip> = raw
            .into_iter()
            .map(|c| Clip {
                id: reel_models::ClipId::from_string(c.id),
                page_url: c.url,
                window,
                title: c.title,
                broadcaster_name: c.broadcaster_name,
                view_count: c.view_count,
                created_at: c.created_at,
            })
            .collect();

        // Newest first; sort_by is stable so platform order breaks ties
        clips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        clips.truncate(max_count as usize);

        info!(
            game = %game_name,
            game_id = %game_id,
            count = clips.len(),
            "Discovered clips"
        );
        Ok(clips)
    }
}
