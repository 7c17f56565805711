//! Vertical reel transcoding.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::FILTER_REEL_VERTICAL_BLUR;
use crate::fs_utils::{discard_partial, ensure_parent_dir};

/// Produces the vertical reel for a downloaded clip.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Transcode `input` into `output`. On failure nothing is left at `output`.
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// FFmpeg-backed transcoder using the blur-letterbox graph.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder {
    runner: FfmpegRunner,
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.runner = self.runner.with_timeout(timeout);
        self
    }

    pub fn with_runner(runner: FfmpegRunner) -> Self {
        Self { runner }
    }

    /// Command for one clip.
    pub fn build_command(input: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .filter_graph(FILTER_REEL_VERTICAL_BLUR)
            .video_codec("libx264")
            .preset("veryfast")
            .crf(20)
            .audio_codec("aac")
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }
        ensure_parent_dir(output).await?;

        let cmd = Self::build_command(input, output);
        let result = self
            .runner
            .run_with_progress(&cmd, |p| {
                debug!(out_time_secs = p.out_time_secs(), speed = p.speed, "Transcode progress");
            })
            .await;

        match result {
            Ok(()) if output.exists() => {
                info!(output = %output.display(), "Transcoded reel");
                Ok(())
            }
            Ok(()) => Err(MediaError::ffmpeg_failed(
                "FFmpeg reported success but wrote no output",
                None,
                Some(0),
            )),
            Err(e) => {
                discard_partial(output).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_command() {
        let args = FfmpegTranscoder::build_command(Path::new("orig.mp4"), Path::new("edited.mp4"))
            .build_args();

        let lavfi = args.iter().position(|a| a == "-lavfi").unwrap();
        assert_eq!(args[lavfi + 1], FILTER_REEL_VERTICAL_BLUR);
        assert_eq!(args.last().map(String::as_str), Some("edited.mp4"));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = FfmpegTranscoder::new()
            .transcode(&dir.path().join("missing.mp4"), &dir.path().join("out.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_failure_removes_partial_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("Edited").join("out.mp4");
        tokio::fs::write(&input, b"not a video").await.unwrap();
        tokio::fs::create_dir_all(output.parent().unwrap()).await.unwrap();
        tokio::fs::write(&output, b"partial").await.unwrap();

        let transcoder = FfmpegTranscoder::with_runner(
            FfmpegRunner::new().with_binary("/nonexistent/ffmpeg-binary"),
        );
        let result = transcoder.transcode(&input, &output).await;

        assert!(result.is_err());
        assert!(!output.exists());
    }
}
