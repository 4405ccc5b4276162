use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{DownloadError, DownloadedVideo, VideoDownloader};

pub const DEFAULT_DOWNLOAD_FORMAT: &str = "bestvideo[height<=720]+bestaudio/best[height<=720]";

/// [`VideoDownloader`] shelling out to `yt-dlp`, merging streams into mp4.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    program: PathBuf,
    format: String,
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new("yt-dlp", DEFAULT_DOWNLOAD_FORMAT)
    }
}

impl YtDlpDownloader {
    pub fn new(program: impl Into<PathBuf>, format: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            format: format.into(),
        }
    }
}

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    async fn download(&self, url: &str, output: &Path) -> Result<DownloadedVideo, DownloadError> {
        tracing::debug!(url, "Downloading video");
        let result = Command::new(&self.program)
            .arg("--no-playlist")
            .arg("--force-overwrites")
            .arg("-f")
            .arg(&self.format)
            .arg("--merge-output-format")
            .arg("mp4")
            .arg("--print")
            .arg("after_move:%(title)s")
            .arg("-o")
            .arg(output)
            .arg("--")
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(DownloadError::Spawn)?;

        if !result.status.success() {
            return Err(DownloadError::Failed(format!(
                "{}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        let title = String::from_utf8_lossy(&result.stdout)
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
            .ok_or_else(|| DownloadError::Metadata("no title printed".to_string()))?;
        let size_bytes = tokio::fs::metadata(output).await?.len();

        tracing::info!(title = %title, size_bytes, "Video downloaded");
        Ok(DownloadedVideo { title, size_bytes })
    }
}
