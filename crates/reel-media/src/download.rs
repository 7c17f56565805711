//! Streaming download of resolved media.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{discard_partial, ensure_parent_dir};

/// Fetches a media URL to a local file.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Download `media_url` to `dest`, creating parent directories.
    /// On failure no partial file is left at `dest`.
    async fn download(&self, media_url: &str, dest: &Path) -> MediaResult<u64>;
}

/// HTTP downloader that streams the body to disk.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    http: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> MediaResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reel-media/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    async fn stream_to(&self, media_url: &str, dest: &Path) -> MediaResult<u64> {
        let response = self.http.get(media_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::download_failed(format!(
                "GET {} returned {}",
                media_url, status
            )));
        }

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(MediaError::download_failed(format!("Empty body from {}", media_url)));
        }

        Ok(written)
    }
}

#[async_trait]
impl MediaDownloader for HttpDownloader {
    async fn download(&self, media_url: &str, dest: &Path) -> MediaResult<u64> {
        ensure_parent_dir(dest).await?;
        debug!(dest = %dest.display(), "Downloading media");

        match self.stream_to(media_url, dest).await {
            Ok(bytes) => {
                info!(
                    output = %dest.display(),
                    size_mb = bytes as f64 / (1024.0 * 1024.0),
                    "Downloaded clip"
                );
                Ok(bytes)
            }
            Err(e) => {
                discard_partial(dest).await;
                Err(e)
            }
        }
    }
}
