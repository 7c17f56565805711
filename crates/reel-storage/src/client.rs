//! S3-compatible staging client.

use std::path::Path;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Default lifetime of a staged URL. Must outlast the longest publish wait.
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(4 * 60 * 60);

/// Configuration for the staging bucket.
#[derive(Debug, Clone)]
pub struct StagingConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for R2-style endpoints)
    pub region: String,
    /// Key prefix for staged reels
    pub prefix: String,
    /// Presigned URL lifetime
    pub link_ttl: Duration,
}

impl StagingConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let link_ttl = match std::env::var("STAGING_LINK_TTL_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| StorageError::config_error("STAGING_LINK_TTL_SECS must be an integer"))?,
            Err(_) => DEFAULT_LINK_TTL,
        };

        Ok(Self {
            endpoint_url: std::env::var("STAGING_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("STAGING_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("STAGING_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("STAGING_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STAGING_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("STAGING_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("STAGING_BUCKET")
                .map_err(|_| StorageError::config_error("STAGING_BUCKET not set"))?,
            region: std::env::var("STAGING_REGION").unwrap_or_else(|_| "auto".to_string()),
            prefix: std::env::var("STAGING_PREFIX").unwrap_or_else(|_| "clips".to_string()),
            link_ttl,
        })
    }
}

/// S3-compatible staging bucket.
#[derive(Clone)]
pub struct S3Staging {
    client: Client,
    bucket: String,
    prefix: String,
    link_ttl: Duration,
}

impl S3Staging {
    /// Create a new staging client from configuration.
    pub fn new(config: StagingConfig) -> StorageResult<Self> {
        if config.link_ttl.is_zero() {
            return Err(StorageError::config_error("staging link TTL must be positive"));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "staging",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            prefix: config.prefix,
            link_ttl: config.link_ttl,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(StagingConfig::from_env()?)
    }

    /// Key prefix applied to staged reels.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn link_ttl(&self) -> Duration {
        self.link_ttl
    }

    /// Upload a file.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}", path.display(), key);
        Ok(())
    }

    /// Generate a presigned URL for GET.
    pub async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Delete an object.
    pub async fn delete_object(&self, key: &str) -> StorageResult<()> {
        debug!("Deleting {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        Ok(())
    }
}

/// MIME type for a staged file, from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
