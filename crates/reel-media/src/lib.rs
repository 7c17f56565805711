//! Media handling for the clip-to-reel pipeline.
//!
//! This crate provides:
//! - Clip page URL resolution through yt-dlp
//! - Streaming HTTP download of the resolved media
//! - Type-safe FFmpeg command building and a runner with timeout
//! - Progress parsing from `-progress pipe:2`
//! - The vertical blur-letterbox transcode

pub mod command;
pub mod download;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod progress;
pub mod resolve;
pub mod transcode;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use download::{HttpDownloader, MediaDownloader};
pub use error::{MediaError, MediaResult};
pub use progress::FfmpegProgress;
pub use resolve::{SourceResolver, YtDlpResolver};
pub use transcode::{FfmpegTranscoder, Transcoder};
