//! Run configuration.
//!
//! Everything is read from the environment once at startup. Missing
//! credentials are collected and reported together before any work begins.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reel_publish::{FacebookConfig, InstagramConfig, PublishPolicy};
use reel_storage::StagingConfig;
use reel_twitch::TwitchConfig;

use crate::error::{RunError, RunResult};

/// Variables that must be present for every run.
const BASE_REQUIRED_VARS: &[&str] = &[
    "TWITCH_CLIENT_ID",
    "TWITCH_CLIENT_SECRET",
    "STAGING_ENDPOINT_URL",
    "STAGING_ACCESS_KEY_ID",
    "STAGING_SECRET_ACCESS_KEY",
    "STAGING_BUCKET",
];

/// A configured publish destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Instagram,
    Facebook,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Instagram => "instagram",
            TargetKind::Facebook => "facebook",
        }
    }

    /// Credentials this target needs.
    pub fn required_vars(&self) -> &'static [&'static str] {
        match self {
            TargetKind::Instagram => &["INSTAGRAM_ACCESS_TOKEN", "INSTAGRAM_USER_ID"],
            TargetKind::Facebook => &["FACEBOOK_PAGE_ACCESS_TOKEN", "FACEBOOK_PAGE_ID"],
        }
    }
}

impl FromStr for TargetKind {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Ok(TargetKind::Instagram),
            "facebook" | "fb" => Ok(TargetKind::Facebook),
            other => Err(RunError::config_error(format!("unknown publish target `{}`", other))),
        }
    }
}

/// When a job's artifacts are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupTiming {
    /// After every configured target confirmed
    #[default]
    AfterAllTargets,
    /// Local files after the first confirmation; the staged object after the last
    AfterFirstConfirmed,
}

impl FromStr for CleanupTiming {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "after_all_targets" | "all" => Ok(CleanupTiming::AfterAllTargets),
            "after_first_confirmed" | "first" => Ok(CleanupTiming::AfterFirstConfirmed),
            other => Err(RunError::config_error(format!("unknown cleanup timing `{}`", other))),
        }
    }
}

/// Pipeline settings (no credentials).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Game to search clips for
    pub game_name: String,
    /// Maximum clips per run
    pub clips_count: u32,
    /// Root of the local Originals/Edited tree
    pub root_path: PathBuf,
    /// Extension of downloaded and edited files
    pub video_extension: String,
    /// Publish targets in dispatch order
    pub targets: Vec<TargetKind>,
    pub cleanup_timing: CleanupTiming,
    pub policy: PublishPolicy,
    pub ytdlp_path: PathBuf,
    pub resolve_timeout: Duration,
    pub download_timeout: Duration,
    pub transcode_timeout: Option<Duration>,
    /// Prometheus listener; exporter disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl RunConfig {
    /// Create config from environment variables.
    pub fn from_env(game_override: Option<String>) -> RunResult<Self> {
        Self::from_lookup(env_lookup, game_override)
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F, game_override: Option<String>) -> RunResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let game_name = game_override
            .filter(|g| !g.trim().is_empty())
            .or_else(|| get("REEL_GAME_NAME"))
            .unwrap_or_else(|| "Valorant".to_string());

        let targets = match get("REEL_PUBLISH_TARGETS") {
            Some(raw) => parse_targets(&raw)?,
            None => vec![TargetKind::Instagram, TargetKind::Facebook],
        };

        let cleanup_timing = match get("REEL_CLEANUP_TIMING") {
            Some(raw) => raw.parse()?,
            None => CleanupTiming::default(),
        };

        let retry_interval = Duration::from_secs(parse_or(&get, "PUBLISH_RETRY_INTERVAL_SECS", 60)?);
        let max_wait = Duration::from_secs(parse_or(&get, "PUBLISH_MAX_WAIT_SECS", 600)?);
        let policy = PublishPolicy::new(retry_interval, max_wait)
            .map_err(|e| RunError::config_error(e.to_string()))?;

        let clips_count: u32 = parse_or(&get, "REEL_CLIPS_COUNT", 1)?;
        if clips_count == 0 {
            return Err(RunError::config_error("REEL_CLIPS_COUNT must be at least 1"));
        }

        let metrics_addr = match get("METRICS_ADDR") {
            Some(raw) => Some(raw.parse::<SocketAddr>().map_err(|_| {
                RunError::config_error(format!("METRICS_ADDR `{}` is not a socket address", raw))
            })?),
            None => None,
        };

        let transcode_timeout = match get("TRANSCODE_TIMEOUT_SECS") {
            Some(_) => Some(Duration::from_secs(parse_or(&get, "TRANSCODE_TIMEOUT_SECS", 0)?)),
            None => None,
        };

        Ok(Self {
            game_name,
            clips_count,
            root_path: get("REEL_ROOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("clips")),
            video_extension: get("REEL_VIDEO_EXTENSION")
                .map(|e| e.trim_start_matches('.').to_string())
                .unwrap_or_else(|| "mp4".to_string()),
            targets,
            cleanup_timing,
            policy,
            ytdlp_path: get("YTDLP_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("yt-dlp")),
            resolve_timeout: Duration::from_secs(parse_or(&get, "RESOLVE_TIMEOUT_SECS", 30)?),
            download_timeout: Duration::from_secs(parse_or(&get, "DOWNLOAD_TIMEOUT_SECS", 300)?),
            transcode_timeout,
            metrics_addr,
        })
    }

    /// Every variable the configured targets and services require.
    pub fn required_vars(&self) -> Vec<&'static str> {
        let mut vars: Vec<&'static str> = BASE_REQUIRED_VARS.to_vec();
        for target in &self.targets {
            vars.extend_from_slice(target.required_vars());
        }
        vars
    }
}

/// Full configuration: pipeline settings plus service credentials.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub run: RunConfig,
    pub twitch: TwitchConfig,
    pub staging: StagingConfig,
    pub instagram: Option<InstagramConfig>,
    pub facebook: Option<FacebookConfig>,
}

impl AppConfig {
    /// Load and validate everything, reporting all missing variables at once.
    pub fn from_env(game_override: Option<String>) -> RunResult<Self> {
        let run = RunConfig::from_env(game_override)?;

        let missing = missing_vars(&run.required_vars(), env_lookup);
        if !missing.is_empty() {
            return Err(RunError::config_error(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let twitch = TwitchConfig::from_env().map_err(|e| RunError::config_error(e.to_string()))?;
        let staging = StagingConfig::from_env().map_err(|e| RunError::config_error(e.to_string()))?;

        let instagram = if run.targets.contains(&TargetKind::Instagram) {
            Some(InstagramConfig::from_env().map_err(|e| RunError::config_error(e.to_string()))?)
        } else {
            None
        };
        let facebook = if run.targets.contains(&TargetKind::Facebook) {
            Some(FacebookConfig::from_env().map_err(|e| RunError::config_error(e.to_string()))?)
        } else {
            None
        };

        Ok(Self {
            run,
            twitch,
            staging,
            instagram,
            facebook,
        })
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Names in `required` with no non-empty value, in order.
pub fn missing_vars<F>(required: &[&'static str], lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    required
        .iter()
        .copied()
        .filter(|name| lookup(name).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

/// Comma-separated, ordered, de-duplicated target list.
pub fn parse_targets(raw: &str) -> RunResult<Vec<TargetKind>> {
    let mut targets = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let kind: TargetKind = part.parse()?;
        if !targets.contains(&kind) {
            targets.push(kind);
        }
    }
    if targets.is_empty() {
        return Err(RunError::config_error("REEL_PUBLISH_TARGETS names no targets"));
    }
    Ok(targets)
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> RunResult<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RunError::config_error(format!("{} has invalid value `{}`", name, raw))),
        None => Ok(default),
    }
}
