use serde::{Deserialize, Serialize};

use super::{ChunkIndex, ReframeMode, StyleConfig, TaskKind};

/// Typed, validated input of one stage task.
#[derive(Debug, Clone, PartialEq)]
pub enum StageRequest {
    GetVideo(GetVideoRequest),
    ExtractSound(ExtractSoundRequest),
    GenerateSubtitles(GenerateSubtitlesRequest),
    TransformSubtitle(TransformSubtitleRequest),
    TransformVideo(TransformVideoRequest),
}

impl StageRequest {
    pub fn kind(&self) -> TaskKind {
        match self {
            StageRequest::GetVideo(_) => TaskKind::GetVideo,
            StageRequest::ExtractSound(_) => TaskKind::ExtractSound,
            StageRequest::GenerateSubtitles(_) => TaskKind::GenerateSubtitles,
            StageRequest::TransformSubtitle(_) => TaskKind::TransformSubtitle,
            StageRequest::TransformVideo(_) => TaskKind::TransformVideo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetVideoRequest {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractSoundRequest {
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateSubtitlesRequest {
    pub audio_files: Vec<AudioChunkRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformSubtitleRequest {
    pub subtitle_srt_file: String,
    pub options: StyleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformVideoRequest {
    pub file_name: String,
    pub options: ReframeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReframeOptions {
    pub video_format: ReframeMode,
    /// Accepted from producers that still send it. Reframing always yields a
    /// single output, so the value is not used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_parts: Option<u32>,
}

impl ReframeOptions {
    pub fn new(video_format: ReframeMode) -> Self {
        Self {
            video_format,
            video_parts: None,
        }
    }
}

/// Reference to an uploaded audio chunk: a bare file name or a file name
/// carrying its index explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AudioChunkRef {
    Indexed {
        index: ChunkIndex,
        file_name: String,
    },
    FileName(String),
}

impl AudioChunkRef {
    pub fn indexed(index: ChunkIndex, file_name: impl Into<String>) -> Self {
        AudioChunkRef::Indexed {
            index,
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            AudioChunkRef::Indexed { file_name, .. } => file_name,
            AudioChunkRef::FileName(file_name) => file_name,
        }
    }

    /// Explicit index, else the one encoded in the file name.
    pub fn index(&self) -> Option<ChunkIndex> {
        match self {
            AudioChunkRef::Indexed { index, .. } => Some(*index),
            AudioChunkRef::FileName(file_name) => ChunkIndex::from_file_name(file_name),
        }
    }
}
