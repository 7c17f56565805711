//! Staging host for processed reels.
//!
//! Publish targets ingest media by URL, so every edited file is uploaded to
//! an S3-compatible bucket and shared through a time-limited presigned GET.
//!
//! This crate provides:
//! - File upload and deletion
//! - Presigned URL generation
//! - The `StagingStore` seam the orchestrator depends on

pub mod client;
pub mod error;
pub mod store;

pub use client::{S3Staging, StagingConfig};
pub use error::{StorageError, StorageResult};
pub use store::StagingStore;
