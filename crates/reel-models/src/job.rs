//! Per-clip processing jobs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ModelError, ModelResult};
use crate::{Clip, ClipPaths, PublishState};

/// A processed file placed on the staging host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedMedia {
    /// Object key on the staging host
    pub key: String,
    /// Publicly fetchable (time-limited) URL
    pub url: String,
}

/// Acknowledgement returned by a target once publication is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Target name
    pub target: String,
    /// Container ID obtained in the create phase
    pub container_id: String,
    /// Published media ID, when the target returns one
    pub media_id: Option<String>,
    /// Number of publish attempts made
    pub attempts: u32,
    /// Accumulated wait before confirmation
    pub waited: Duration,
}

/// Publish progress of a job against a single target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPublish {
    pub target: String,
    pub state: PublishState,
    pub receipt: Option<PublishReceipt>,
}

impl TargetPublish {
    /// Move to `next`, refusing transitions the state machine does not allow.
    pub fn transition(&mut self, next: PublishState) -> ModelResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(ModelError::IllegalTransition {
                target: self.target.clone(),
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Record the receipt and move to `Confirmed`.
    pub fn confirm(&mut self, receipt: PublishReceipt) -> ModelResult<()> {
        self.transition(PublishState::Confirmed)?;
        self.receipt = Some(receipt);
        Ok(())
    }
}

/// One clip's journey through the pipeline.
///
/// Owned exclusively by the orchestrator. The setters enforce ordering:
/// a job is only staged once an edited file exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingJob {
    /// Position in discovery order
    pub index: usize,
    /// Source clip
    pub clip: Clip,
    /// Deterministic local paths
    pub paths: ClipPaths,
    local_original_path: Option<PathBuf>,
    local_edited_path: Option<PathBuf>,
    staged: Option<StagedMedia>,
    publish: Vec<TargetPublish>,
}

impl ProcessingJob {
    pub fn new(index: usize, clip: Clip, paths: ClipPaths) -> Self {
        Self {
            index,
            clip,
            paths,
            local_original_path: None,
            local_edited_path: None,
            staged: None,
            publish: Vec::new(),
        }
    }

    /// Record that the source file was downloaded to its original path.
    pub fn mark_downloaded(&mut self) -> &Path {
        self.local_original_path.insert(self.paths.original())
    }

    /// Record that resolve and transcode both succeeded.
    pub fn mark_transcoded(&mut self) -> &Path {
        self.local_edited_path.insert(self.paths.edited())
    }

    /// Record the staged copy. Refused when there is no edited file.
    pub fn mark_staged(&mut self, media: StagedMedia) -> ModelResult<&StagedMedia> {
        if self.local_edited_path.is_none() {
            return Err(ModelError::NotTranscoded(self.index));
        }
        Ok(&*self.staged.insert(media))
    }

    pub fn local_original_path(&self) -> Option<&Path> {
        self.local_original_path.as_deref()
    }

    pub fn local_edited_path(&self) -> Option<&Path> {
        self.local_edited_path.as_deref()
    }

    pub fn staged(&self) -> Option<&StagedMedia> {
        self.staged.as_ref()
    }

    /// Open a publish record for `target` in state `Created`.
    pub fn begin_publish(&mut self, target: impl Into<String>) -> &mut TargetPublish {
        self.publish.push(TargetPublish {
            target: target.into(),
            state: PublishState::Created,
            receipt: None,
        });
        let last = self.publish.len() - 1;
        &mut self.publish[last]
    }

    pub fn publish_records(&self) -> &[TargetPublish] {
        &self.publish
    }

    /// Receipts of every confirmed target, in dispatch order.
    pub fn receipts(&self) -> Vec<PublishReceipt> {
        self.publish
            .iter()
            .filter_map(|record| record.receipt.clone())
            .collect()
    }

    /// At least one target reached `Confirmed`.
    pub fn is_cleanup_eligible(&self) -> bool {
        self.publish
            .iter()
            .any(|record| record.state == PublishState::Confirmed)
    }
}
