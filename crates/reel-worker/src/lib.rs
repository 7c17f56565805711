//! Clip-to-reel pipeline runner.
//!
//! This crate provides:
//! - Run configuration with up-front validation
//! - The two-pass orchestrator (prepare every clip, then stage and publish)
//! - Post-publish cleanup of local and staged artifacts
//! - Per-clip run reports and structured clip logging

pub mod cleanup;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod report;

#[cfg(test)]
mod orchestrator_tests;

pub use cleanup::{CleanupManager, CleanupReport};
pub use config::{AppConfig, CleanupTiming, RunConfig, TargetKind};
pub use error::{RunAborted, RunError, RunResult};
pub use logging::ClipLogger;
pub use orchestrator::{Collaborators, Orchestrator};
pub use report::{ClipOutcome, ClipReport, RunReport};
