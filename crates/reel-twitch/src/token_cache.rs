//! App access token caching for the Helix API.
//!
//! The token is fetched lazily on the first request and reused for the
//! life of the client. It is only exchanged again when it is close to
//! expiry or when the API rejects it.

use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::debug;

use crate::client::TwitchConfig;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::types::TokenResponse;

/// Refresh margin: refresh token 60 seconds before expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// TTL assumed when the token response carries no `expires_in`.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Lazily populated app access token.
pub struct TokenCache {
    cache: RwLock<Option<CachedToken>>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(None),
        }
    }

    /// Invalidate the cached token.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }

    /// Get a valid access token, exchanging credentials if necessary.
    pub async fn get_token(&self, http: &Client, config: &TwitchConfig) -> DiscoveryResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(cached.access_token.clone());
            }
        }

        let token = exchange_credentials(http, config).await?;
        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(TOKEN_DEFAULT_TTL);

        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: expiry(Instant::now(), ttl),
        });

        debug!(ttl_secs = ttl.as_secs(), "Obtained Twitch app access token");
        Ok(token.access_token)
    }
}

/// Expiry instant for a token issued at `now`. A TTL too large for the
/// platform clock falls back to the default.
fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or(now + TOKEN_DEFAULT_TTL)
}

/// OAuth2 client-credentials exchange.
async fn exchange_credentials(http: &Client, config: &TwitchConfig) -> DiscoveryResult<TokenResponse> {
    let response = http
        .post(&config.auth_url)
        .query(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ])
        .send()
        .await
        .map_err(|e| DiscoveryError::auth_error(format!("Token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DiscoveryError::auth_error(format!(
            "Token endpoint returned {}: {}",
            status, body
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| DiscoveryError::auth_error(format!("Malformed token response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_validity_margin() {
        let fresh = CachedToken {
            access_token: "t".into(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };
        let expiring = CachedToken {
            access_token: "t".into(),
            expires_at: Instant::now() + Duration::from_secs(30),
        };

        assert!(fresh.is_valid());
        assert!(!expiring.is_valid());
    }

    #[test]
    fn test_huge_expires_in_does_not_overflow() {
        let now = Instant::now();

        assert_eq!(expiry(now, Duration::MAX), now + TOKEN_DEFAULT_TTL);
        assert_eq!(expiry(now, Duration::from_secs(u64::MAX)), now + TOKEN_DEFAULT_TTL);
        assert_eq!(expiry(now, Duration::from_secs(3600)), now + Duration::from_secs(3600));
    }
}
