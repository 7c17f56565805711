//! Per-run outcome report.

use serde::Serialize;
use tracing::{info, warn};

use reel_models::{ClipId, DiscoveryWindow, PublishReceipt, RunId};

/// What happened to one clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClipOutcome {
    /// Resolve, download or transcode failed; the clip was dropped.
    Skipped { reason: String },
    /// Every configured target confirmed.
    Published { receipts: Vec<PublishReceipt> },
    /// Publishing this clip failed and aborted the run.
    PublishFailed {
        reason: String,
        receipts: Vec<PublishReceipt>,
    },
    /// Prepared, but the run ended before its publish phase.
    NotPublished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipReport {
    pub index: usize,
    pub clip_id: ClipId,
    pub page_url: String,
    pub outcome: ClipOutcome,
}

/// Outcome of a run, one entry per discovered clip in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub game_name: String,
    pub window: DiscoveryWindow,
    pub clips: Vec<ClipReport>,
}

impl RunReport {
    pub fn new(run_id: RunId, game_name: impl Into<String>, window: DiscoveryWindow) -> Self {
        Self {
            run_id,
            game_name: game_name.into(),
            window,
            clips: Vec::new(),
        }
    }

    pub fn record(&mut self, index: usize, clip_id: ClipId, page_url: impl Into<String>, outcome: ClipOutcome) {
        self.clips.push(ClipReport {
            index,
            clip_id,
            page_url: page_url.into(),
            outcome,
        });
    }

    /// Replace the outcome of the clip at `index`.
    pub fn set_outcome(&mut self, index: usize, outcome: ClipOutcome) {
        if let Some(entry) = self.clips.iter_mut().find(|c| c.index == index) {
            entry.outcome = outcome;
        }
    }

    pub fn outcome(&self, index: usize) -> Option<&ClipOutcome> {
        self.clips.iter().find(|c| c.index == index).map(|c| &c.outcome)
    }

    pub fn published_count(&self) -> usize {
        self.clips
            .iter()
            .filter(|c| matches!(c.outcome, ClipOutcome::Published { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.clips
            .iter()
            .filter(|c| matches!(c.outcome, ClipOutcome::Skipped { .. }))
            .count()
    }

    /// One log line per clip, then a totals line.
    pub fn log_summary(&self) {
        for clip in &self.clips {
            match &clip.outcome {
                ClipOutcome::Published { receipts } => {
                    let media: Vec<String> = receipts
                        .iter()
                        .map(|r| format!("{}={}", r.target, r.media_id.as_deref().unwrap_or("-")))
                        .collect();
                    info!(clip_index = clip.index, clip_id = %clip.clip_id, "Published: {}", media.join(", "));
                }
                ClipOutcome::Skipped { reason } => {
                    warn!(clip_index = clip.index, clip_id = %clip.clip_id, "Skipped: {}", reason);
                }
                ClipOutcome::PublishFailed { reason, .. } => {
                    warn!(clip_index = clip.index, clip_id = %clip.clip_id, "Publish failed: {}", reason);
                }
                ClipOutcome::NotPublished => {
                    warn!(clip_index = clip.index, clip_id = %clip.clip_id, "Not published: run aborted first");
                }
            }
        }

        info!(
            run_id = %self.run_id,
            game = %self.game_name,
            discovered = self.clips.len(),
            published = self.published_count(),
            skipped = self.skipped_count(),
            "Run summary"
        );
    }
}
