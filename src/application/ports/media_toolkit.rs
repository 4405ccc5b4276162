use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ReframeDecision, VideoDimensions};

/// Media encoding and probing tool (ffmpeg/ffprobe or equivalent).
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Writes the first audio stream of `video` as mono 16 kHz PCM WAV.
    async fn extract_normalized_audio(&self, video: &Path, output: &Path)
    -> Result<(), MediaToolError>;

    async fn probe_duration(&self, media: &Path) -> Result<Duration, MediaToolError>;

    async fn probe_dimensions(&self, video: &Path) -> Result<VideoDimensions, MediaToolError>;

    /// Copies `[start, start + duration)` of `audio` to `output`.
    async fn cut_audio(
        &self,
        audio: &Path,
        start: Duration,
        duration: Duration,
        output: &Path,
    ) -> Result<(), MediaToolError>;

    /// Applies a non-pass-through decision with its encode parameters.
    async fn reframe(
        &self,
        video: &Path,
        decision: &ReframeDecision,
        output: &Path,
    ) -> Result<(), MediaToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaToolError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("probe output unusable: {0}")]
    Probe(String),
    #[error("nothing to encode for a pass-through decision")]
    PassThrough,
}
