//! Discovered clip descriptors.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform identifier of a clip. Opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open time window `[start, end)` clips were searched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DiscoveryWindow {
    /// Create a window from explicit bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The 24 hours ending at `now`.
    pub fn last_24h(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::hours(24),
            end: now,
        }
    }

    /// `started_at` query value (RFC 3339, `Z` suffix).
    pub fn started_at(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `ended_at` query value (RFC 3339, `Z` suffix).
    pub fn ended_at(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Window length.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

/// A discovered clip. Immutable once produced by discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Platform clip ID
    pub id: ClipId,
    /// Viewable clip page URL
    pub page_url: String,
    /// Window the clip was discovered in
    pub window: DiscoveryWindow,
    /// Clip title
    #[serde(default)]
    pub title: String,
    /// Channel the clip was captured from
    #[serde(default)]
    pub broadcaster_name: String,
    /// Platform-reported view count
    #[serde(default)]
    pub view_count: u64,
    /// Platform-reported creation time
    pub created_at: DateTime<Utc>,
}

impl Clip {
    /// Create a clip with only the fields the pipeline depends on.
    pub fn new(
        id: impl Into<String>,
        page_url: impl Into<String>,
        window: DiscoveryWindow,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ClipId::from_string(id),
            page_url: page_url.into(),
            window,
            title: String::new(),
            broadcaster_name: String::new(),
            view_count: 0,
            created_at,
        }
    }
}
