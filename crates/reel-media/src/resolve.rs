//! Clip page URL to direct media URL resolution.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Default resolver timeout.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns a clip page URL into a URL the downloader can fetch.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve `page_url`. An empty result is a failure.
    async fn resolve(&self, page_url: &str) -> MediaResult<String>;
}

/// Resolver backed by `yt-dlp --get-url`.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    binary: PathBuf,
    timeout: Duration,
    format: String,
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new("yt-dlp", DEFAULT_RESOLVE_TIMEOUT)
    }
}

impl YtDlpResolver {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            format: "best".to_string(),
        }
    }

    /// Override the yt-dlp format selector.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    fn build_args(&self, page_url: &str) -> Vec<String> {
        vec![
            "--get-url".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "-f".to_string(),
            self.format.clone(),
            page_url.to_string(),
        ]
    }
}

#[async_trait]
impl SourceResolver for YtDlpResolver {
    async fn resolve(&self, page_url: &str) -> MediaResult<String> {
        which::which(&self.binary)
            .map_err(|_| MediaError::YtDlpNotFound(self.binary.display().to_string()))?;

        debug!(page_url = %page_url, "Resolving media URL with yt-dlp");

        let child = Command::new(&self.binary)
            .args(self.build_args(page_url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| MediaError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last = stderr.lines().last().unwrap_or("Unknown error");
            return Err(MediaError::resolve_failed(format!("yt-dlp failed: {}", last)));
        }

        let media_url = first_media_url(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| MediaError::resolve_failed(format!("No media URL for {}", page_url)))?;

        info!(page_url = %page_url, "Resolved media URL");
        Ok(media_url)
    }
}

/// First non-empty line of resolver output that parses as an http(s) URL.
fn first_media_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| {
            url::Url::parse(line)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false)
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_media_url() {
        let out = "\n  https://production.assets.clips.twitchcdn.net/abc.mp4?sig=1  \nhttps://other\n";
        assert_eq!(
            first_media_url(out).as_deref(),
            Some("https://production.assets.clips.twitchcdn.net/abc.mp4?sig=1")
        );
    }

    #[test]
    fn test_blank_output_resolves_to_nothing() {
        assert_eq!(first_media_url(""), None);
        assert_eq!(first_media_url("   \n\n"), None);
        assert_eq!(first_media_url("NA\n"), None);
    }

    #[test]
    fn test_args() {
        let resolver = YtDlpResolver::default().with_format("best[ext=mp4]");
        let args = resolver.build_args("https://clips.twitch.tv/x");

        assert_eq!(args.first().map(String::as_str), Some("--get-url"));
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == "best[ext=mp4]"));
        assert_eq!(args.last().map(String::as_str), Some("https://clips.twitch.tv/x"));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let resolver = YtDlpResolver::new("/nonexistent/yt-dlp", Duration::from_secs(1));
        let err = resolver.resolve("https://clips.twitch.tv/x").await.unwrap_err();

        assert!(matches!(err, MediaError::YtDlpNotFound(_)));
    }
}
