//! Structured clip logging utilities.
//!
//! Provides consistent, structured logging for per-clip processing with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

use reel_models::{ProcessingJob, RunId};

/// Clip logger for structured logging with consistent formatting.
///
/// Every line carries the run ID, the clip's position in discovery order
/// and its platform ID.
#[derive(Debug, Clone)]
pub struct ClipLogger {
    run_id: String,
    clip_index: usize,
    clip_id: String,
}

impl ClipLogger {
    pub fn new(run_id: &RunId, job: &ProcessingJob) -> Self {
        Self {
            run_id: run_id.to_string(),
            clip_index: job.index,
            clip_id: job.clip.id.to_string(),
        }
    }

    /// Log the start of a clip stage.
    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            clip_index = self.clip_index,
            clip_id = %self.clip_id,
            "Clip started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            clip_index = self.clip_index,
            clip_id = %self.clip_id,
            "Clip progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            clip_index = self.clip_index,
            clip_id = %self.clip_id,
            "Clip warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            clip_index = self.clip_index,
            clip_id = %self.clip_id,
            "Clip error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            clip_index = self.clip_index,
            clip_id = %self.clip_id,
            "Clip completed: {}", message
        );
    }

    pub fn clip_index(&self) -> usize {
        self.clip_index
    }

    pub fn clip_id(&self) -> &str {
        &self.clip_id
    }

    /// Create a tracing span for this clip.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "clip",
            run_id = %self.run_id,
            clip_index = self.clip_index,
            clip_id = %self.clip_id
        )
    }
}
