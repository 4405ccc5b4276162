use std::path::Path;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedVideo {
    pub title: String,
    pub size_bytes: u64,
}

/// Fetches a remote video into a local mp4 file.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    async fn download(&self, url: &str, output: &Path) -> Result<DownloadedVideo, DownloadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("failed to launch downloader: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("downloader failed: {0}")]
    Failed(String),
    #[error("video metadata unusable: {0}")]
    Metadata(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
