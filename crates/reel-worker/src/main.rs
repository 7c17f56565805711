//! Clip-to-reel pipeline binary.
//!
//! Usage: `reel-worker [GAME_NAME]`

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_media::{check_ffmpeg, FfmpegTranscoder, HttpDownloader, YtDlpResolver};
use reel_publish::{FacebookReels, InstagramReels, PublishCoordinator, PublishTarget};
use reel_storage::S3Staging;
use reel_twitch::HelixClient;
use reel_worker::{AppConfig, Collaborators, Orchestrator, TargetKind};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,reel=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting reel-worker");

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

/// Build everything from the environment and run once. `Ok(false)` means
/// the run aborted after starting work.
async fn run() -> anyhow::Result<bool> {
    let game_override = std::env::args().nth(1);
    let config = AppConfig::from_env(game_override).context("Invalid configuration")?;
    info!(
        game = %config.run.game_name,
        clips = config.run.clips_count,
        targets = ?config.run.targets,
        "Loaded configuration"
    );

    if let Some(addr) = config.run.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!(%addr, "Metrics exporter listening");
    }

    if let Err(e) = check_ffmpeg() {
        warn!("FFmpeg check failed, every transcode will fail: {}", e);
    }

    let run = &config.run;
    let source = HelixClient::new(config.twitch.clone()).context("Failed to create Twitch client")?;
    let downloader = HttpDownloader::new(run.download_timeout).context("Failed to create downloader")?;
    let mut transcoder = FfmpegTranscoder::new();
    if let Some(timeout) = run.transcode_timeout {
        transcoder = transcoder.with_timeout(timeout);
    }
    let staging = S3Staging::new(config.staging.clone()).context("Failed to create staging client")?;

    let mut targets: Vec<Arc<dyn PublishTarget>> = Vec::with_capacity(run.targets.len());
    for kind in &run.targets {
        let target: Arc<dyn PublishTarget> = match kind {
            TargetKind::Instagram => {
                let cfg = config
                    .instagram
                    .clone()
                    .context("Instagram target enabled without credentials")?;
                Arc::new(InstagramReels::new(cfg).context("Failed to create Instagram client")?)
            }
            TargetKind::Facebook => {
                let cfg = config
                    .facebook
                    .clone()
                    .context("Facebook target enabled without credentials")?;
                Arc::new(FacebookReels::new(cfg).context("Failed to create Facebook client")?)
            }
        };
        targets.push(target);
    }

    let collaborators = Collaborators {
        source: Arc::new(source),
        resolver: Arc::new(YtDlpResolver::new(&run.ytdlp_path, run.resolve_timeout)),
        downloader: Arc::new(downloader),
        transcoder: Arc::new(transcoder),
        staging: Arc::new(staging),
        targets,
    };
    let coordinator = PublishCoordinator::with_tokio_sleeper(run.policy)?;
    let orchestrator = Orchestrator::new(run.clone(), collaborators, coordinator)?;

    match orchestrator.run(Utc::now()).await {
        Ok(report) => {
            report.log_summary();
            debug!(report = %serde_json::to_string(&report).unwrap_or_default(), "Run report");
            Ok(true)
        }
        Err(aborted) => {
            aborted.report.log_summary();
            error!(kind = aborted.error.kind(), "Run aborted: {}", aborted.error);
            Ok(false)
        }
    }
}
