use std::fmt;

use super::StreamId;

/// Object-store key, always `<stream_id>/<relative_path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn new(stream_id: &StreamId, relative_path: &str) -> Self {
        Self(format!(
            "{}/{}",
            stream_id.as_str(),
            relative_path.trim_start_matches('/')
        ))
    }

    pub fn audio_chunk(stream_id: &StreamId, file_name: &str) -> Self {
        Self::new(stream_id, &format!("audios/{}", file_name))
    }

    pub fn chunk_subtitles(stream_id: &StreamId, file_name: &str) -> Self {
        Self::new(stream_id, &format!("subtitles/{}", file_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
