//! Two-pass run orchestration.
//!
//! Pass one prepares every discovered clip (resolve, download, transcode),
//! isolating failures per clip. Pass two stages and publishes the prepared
//! jobs in order; any failure there aborts the run with the report so far.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn, Instrument};

use reel_media::fs_utils::remove_if_exists;
use reel_media::{MediaDownloader, MediaError, SourceResolver, Transcoder};
use reel_models::{ClipPaths, DiscoveryWindow, ProcessingJob, RunId};
use reel_publish::{PublishCoordinator, PublishTarget};
use reel_storage::StagingStore;
use reel_twitch::ClipSource;

use crate::cleanup::CleanupManager;
use crate::config::{CleanupTiming, RunConfig};
use crate::error::{RunAborted, RunError, RunResult};
use crate::logging::ClipLogger;
use crate::metrics;
use crate::report::{ClipOutcome, RunReport};

/// External capabilities a run depends on.
pub struct Collaborators {
    pub source: Arc<dyn ClipSource>,
    pub resolver: Arc<dyn SourceResolver>,
    pub downloader: Arc<dyn MediaDownloader>,
    pub transcoder: Arc<dyn Transcoder>,
    pub staging: Arc<dyn StagingStore>,
    /// Publish targets in dispatch order
    pub targets: Vec<Arc<dyn PublishTarget>>,
}

/// Turns a game name into published reels.
pub struct Orchestrator {
    config: RunConfig,
    collaborators: Collaborators,
    coordinator: PublishCoordinator,
    cleanup: CleanupManager,
}

impl Orchestrator {
    pub fn new(
        config: RunConfig,
        collaborators: Collaborators,
        coordinator: PublishCoordinator,
    ) -> RunResult<Self> {
        if collaborators.targets.is_empty() {
            return Err(RunError::config_error("At least one publish target is required"));
        }
        let cleanup = CleanupManager::new(Arc::clone(&collaborators.staging));

        Ok(Self {
            config,
            collaborators,
            coordinator,
            cleanup,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run once for the 24 hours ending at `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunReport, RunAborted> {
        let window = DiscoveryWindow::last_24h(now);
        let mut report = RunReport::new(RunId::new(), &self.config.game_name, window);

        info!(
            run_id = %report.run_id,
            game = %self.config.game_name,
            started_at = %window.started_at(),
            ended_at = %window.ended_at(),
            "Discovering clips"
        );

        let clips = match self
            .collaborators
            .source
            .discover(&self.config.game_name, window, self.config.clips_count)
            .await
        {
            Ok(clips) => clips,
            Err(e) => return Err(abort(report, e.into())),
        };

        if clips.is_empty() {
            info!(run_id = %report.run_id, "No clips found, nothing to do");
            metrics::record_run("completed", "none");
            return Ok(report);
        }
        info!(run_id = %report.run_id, count = clips.len(), "Discovered clips");

        let mut prepared = Vec::with_capacity(clips.len());
        for (index, clip) in clips.into_iter().enumerate() {
            let paths = ClipPaths::new(
                &self.config.root_path,
                &self.config.game_name,
                index,
                &self.config.video_extension,
            );
            let mut job = ProcessingJob::new(index, clip, paths);
            let logger = ClipLogger::new(&report.run_id, &job);

            let result = self
                .prepare(&mut job, &logger)
                .instrument(logger.create_span())
                .await;

            match result {
                Ok(()) => {
                    metrics::record_clip("prepared");
                    report.record(index, job.clip.id.clone(), &job.clip.page_url, ClipOutcome::NotPublished);
                    prepared.push(job);
                }
                Err(e) if e.is_per_clip() => {
                    logger.log_warning(&format!("skipped: {}", e));
                    metrics::record_clip("skipped");
                    report.record(
                        index,
                        job.clip.id.clone(),
                        &job.clip.page_url,
                        ClipOutcome::Skipped { reason: e.to_string() },
                    );
                }
                Err(e) => {
                    logger.log_error(&e.to_string());
                    return Err(abort(report, e));
                }
            }
        }

        for mut job in prepared {
            let logger = ClipLogger::new(&report.run_id, &job);

            let result = self
                .publish(&mut job, &logger)
                .instrument(logger.create_span())
                .await;

            match result {
                Ok(()) => {
                    report.set_outcome(job.index, ClipOutcome::Published { receipts: job.receipts() });
                }
                Err(e) => {
                    logger.log_error(&e.to_string());
                    report.set_outcome(
                        job.index,
                        ClipOutcome::PublishFailed {
                            reason: e.to_string(),
                            receipts: job.receipts(),
                        },
                    );
                    return Err(abort(report, e));
                }
            }
        }

        metrics::record_run("completed", "none");
        Ok(report)
    }

    /// Resolve, download and transcode one clip.
    async fn prepare(&self, job: &mut ProcessingJob, logger: &ClipLogger) -> RunResult<()> {
        logger.log_start(&job.clip.page_url);

        let media_url = self
            .collaborators
            .resolver
            .resolve(&job.clip.page_url)
            .await
            .map_err(RunError::Resolve)?;
        let media_url = media_url.trim();
        if media_url.is_empty() {
            return Err(RunError::Resolve(MediaError::resolve_failed(
                "resolver returned an empty URL",
            )));
        }

        let original = job.paths.original();
        match self.collaborators.downloader.download(media_url, &original).await {
            Ok(bytes) => logger.log_progress(&format!("downloaded {} bytes", bytes)),
            Err(e) => {
                discard(&original).await;
                return Err(RunError::Download(e));
            }
        }
        job.mark_downloaded();

        let edited = job.paths.edited();
        if let Err(e) = self.collaborators.transcoder.transcode(&original, &edited).await {
            discard(&edited).await;
            return Err(RunError::Transcode(e));
        }
        job.mark_transcoded();

        logger.log_completion(&format!("reel ready at {}", edited.display()));
        Ok(())
    }

    /// Stage one prepared job and publish it to every target in order.
    async fn publish(&self, job: &mut ProcessingJob, logger: &ClipLogger) -> RunResult<()> {
        let edited = job.paths.edited();
        let key = job.paths.staging_key(self.collaborators.staging.prefix());
        let staged = self.collaborators.staging.stage(&edited, &key).await?;
        let media_url = job.mark_staged(staged)?.url.clone();
        logger.log_progress(&format!("staged as {}", key));

        let timing = self.config.cleanup_timing;
        let mut local_removed = false;

        for target in &self.collaborators.targets {
            let record = job.begin_publish(target.name());
            let receipt = self
                .coordinator
                .publish(target.as_ref(), &media_url, record)
                .await?;
            logger.log_progress(&format!(
                "{} confirmed after {}s ({} attempts)",
                receipt.target,
                receipt.waited.as_secs(),
                receipt.attempts
            ));

            if timing == CleanupTiming::AfterFirstConfirmed && !local_removed {
                self.cleanup.remove_local(job).await?;
                local_removed = true;
            }
        }

        match timing {
            CleanupTiming::AfterAllTargets => {
                self.cleanup.cleanup(job).await?;
            }
            CleanupTiming::AfterFirstConfirmed => {
                self.cleanup.remove_staged(job).await?;
            }
        }

        logger.log_completion("published");
        Ok(())
    }
}

/// Remove partial output left by a failed step.
async fn discard(path: &std::path::Path) {
    if let Err(e) = remove_if_exists(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove partial file");
    }
}

fn abort(report: RunReport, error: RunError) -> RunAborted {
    warn!(run_id = %report.run_id, kind = error.kind(), error = %error, "Run aborted");
    metrics::record_run("aborted", error.kind());
    RunAborted { report, error }
}
