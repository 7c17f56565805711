//! Helix request/response types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Client-credentials token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Helix list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixData<T> {
    pub data: Vec<T>,
}

/// Entry from `GET /games`.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixGame {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Entry from `GET /clips`.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixClip {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub broadcaster_name: String,
    #[serde(default)]
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
}
