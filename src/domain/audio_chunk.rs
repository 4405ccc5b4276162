use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::StreamId;

/// 1-based position of a chunk window within the source audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ChunkIndex(u32);

impl ChunkIndex {
    pub const FIRST: ChunkIndex = ChunkIndex(1);

    pub fn new(value: u32) -> Option<Self> {
        (value >= 1).then_some(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Number of whole windows preceding this chunk.
    pub fn preceding_windows(&self) -> u32 {
        self.0 - 1
    }

    /// `None` past the last representable index.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Recovers the index from a generated chunk file name such as
    /// `abc_12.wav` or `abc_12.srt`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"_(\d+)\.(?:wav|srt)$").expect("chunk file name pattern is valid")
        });
        pattern
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .and_then(Self::new)
    }
}

impl TryFrom<u32> for ChunkIndex {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("chunk index must be >= 1, got {}", value))
    }
}

impl From<ChunkIndex> for u32 {
    fn from(index: ChunkIndex) -> Self {
        index.0
    }
}

impl fmt::Display for ChunkIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One fixed-length slice of the source audio timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWindow {
    pub index: ChunkIndex,
    pub start_offset: Duration,
    pub duration: Duration,
}

/// A chunk window materialised as a local audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub index: ChunkIndex,
    pub start_offset: Duration,
    pub path: PathBuf,
}

impl AudioChunk {
    pub fn new(index: ChunkIndex, window: Duration, path: PathBuf) -> Self {
        Self {
            index,
            start_offset: window * index.preceding_windows(),
            path,
        }
    }
}

pub fn chunk_audio_file_name(stream_id: &StreamId, index: ChunkIndex) -> String {
    format!("{}_{}.wav", stream_id, index)
}

pub fn chunk_subtitle_file_name(stream_id: &StreamId, index: ChunkIndex) -> String {
    format!("{}_{}.srt", stream_id, index)
}
