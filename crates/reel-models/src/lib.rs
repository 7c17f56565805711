//! Shared data models for the clip-to-reel pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Discovered clips and their discovery window
//! - Deterministic local/staging paths per clip
//! - Per-clip processing jobs
//! - The per-target publish state machine

pub mod clip;
pub mod error;
pub mod job;
pub mod paths;
pub mod publish_state;
pub mod run;

// Re-export common types
pub use clip::{Clip, ClipId, DiscoveryWindow};
pub use error::{ModelError, ModelResult};
pub use job::{ProcessingJob, PublishReceipt, StagedMedia, TargetPublish};
pub use paths::ClipPaths;
pub use publish_state::PublishState;
pub use run::RunId;
