//! Post-publish artifact cleanup.

use std::sync::Arc;
use tracing::{debug, warn};

use reel_media::fs_utils::remove_if_exists;
use reel_models::ProcessingJob;
use reel_storage::StagingStore;

use crate::error::{RunError, RunResult};
use crate::metrics;

/// What a cleanup call removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Local files removed
    pub local_removed: usize,
    /// Local removals that failed
    pub local_failed: usize,
    /// Staged object deleted
    pub staged_removed: bool,
}

/// Removes a job's local and staged artifacts once it has been published.
///
/// Every entry point refuses jobs with no `Confirmed` target. Removal
/// failures are logged and counted; they never fail the run.
pub struct CleanupManager {
    staging: Arc<dyn StagingStore>,
}

impl CleanupManager {
    pub fn new(staging: Arc<dyn StagingStore>) -> Self {
        Self { staging }
    }

    /// Remove local original and edited files plus the staged object.
    pub async fn cleanup(&self, job: &ProcessingJob) -> RunResult<CleanupReport> {
        let local = self.remove_local(job).await?;
        let staged = self.remove_staged(job).await?;
        Ok(CleanupReport {
            staged_removed: staged.staged_removed,
            ..local
        })
    }

    /// Remove the local original and edited files. Missing files are fine.
    pub async fn remove_local(&self, job: &ProcessingJob) -> RunResult<CleanupReport> {
        ensure_eligible(job)?;

        let mut report = CleanupReport::default();
        for path in [job.paths.original(), job.paths.edited()] {
            match remove_if_exists(&path).await {
                Ok(true) => report.local_removed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove local file");
                    report.local_failed += 1;
                }
            }
        }

        metrics::record_cleanup("local", report.local_failed == 0);
        debug!(clip_index = job.index, removed = report.local_removed, "Removed local files");
        Ok(report)
    }

    /// Delete the staged object, if the job was staged.
    pub async fn remove_staged(&self, job: &ProcessingJob) -> RunResult<CleanupReport> {
        ensure_eligible(job)?;

        let mut report = CleanupReport::default();
        let Some(staged) = job.staged() else {
            return Ok(report);
        };

        match self.staging.remove(&staged.key).await {
            Ok(()) => {
                report.staged_removed = true;
                debug!(key = %staged.key, "Removed staged object");
            }
            Err(e) => warn!(key = %staged.key, error = %e, "Failed to remove staged object"),
        }
        metrics::record_cleanup("staged", report.staged_removed);
        Ok(report)
    }
}

fn ensure_eligible(job: &ProcessingJob) -> RunResult<()> {
    if job.is_cleanup_eligible() {
        Ok(())
    } else {
        Err(RunError::CleanupRefused(job.index))
    }
}
