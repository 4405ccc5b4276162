use std::path::Path;

use async_trait::async_trait;

use crate::domain::TranscriptWord;

/// External speech-to-text collaborator. Words come back ordered by start.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<TranscriptWord>, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("reading audio failed: {0}")]
    AudioUnreadable(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("engine configuration invalid: {0}")]
    Configuration(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
}
