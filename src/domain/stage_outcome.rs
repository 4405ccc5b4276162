use serde::Serialize;

use super::{AudioChunkRef, JobStage, StreamId, TaskKind};

/// Success payload of one stage, posted to the result callback as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StageOutcome {
    VideoDownloaded(VideoDownloaded),
    SoundExtracted(SoundExtracted),
    SubtitlesGenerated(SubtitlesGenerated),
    SubtitleStyled(SubtitleStyled),
    VideoReframed(VideoReframed),
}

impl StageOutcome {
    pub fn task(&self) -> TaskKind {
        match self {
            StageOutcome::VideoDownloaded(_) => TaskKind::GetVideo,
            StageOutcome::SoundExtracted(_) => TaskKind::ExtractSound,
            StageOutcome::SubtitlesGenerated(_) => TaskKind::GenerateSubtitles,
            StageOutcome::SubtitleStyled(_) => TaskKind::TransformSubtitle,
            StageOutcome::VideoReframed(_) => TaskKind::TransformVideo,
        }
    }

    /// Stages the job has reached once this outcome is reported.
    pub fn stages(&self) -> &'static [JobStage] {
        match self {
            StageOutcome::VideoDownloaded(_) => &[JobStage::Downloaded],
            StageOutcome::SoundExtracted(_) => &[JobStage::Chunked],
            StageOutcome::SubtitlesGenerated(_) => &[JobStage::Transcribed, JobStage::Merged],
            StageOutcome::SubtitleStyled(_) => &[JobStage::Styled],
            StageOutcome::VideoReframed(_) => &[JobStage::Reframed],
        }
    }

    pub fn stream_id(&self) -> &StreamId {
        match self {
            StageOutcome::VideoDownloaded(o) => &o.stream_id,
            StageOutcome::SoundExtracted(o) => &o.stream_id,
            StageOutcome::SubtitlesGenerated(o) => &o.stream_id,
            StageOutcome::SubtitleStyled(o) => &o.stream_id,
            StageOutcome::VideoReframed(o) => &o.stream_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoDownloaded {
    pub file_name: String,
    pub original_file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub stream_id: StreamId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundExtracted {
    pub audio_files: Vec<AudioChunkRef>,
    pub stream_id: StreamId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitlesGenerated {
    pub subtitle_srt_file: String,
    pub subtitle_srt_files: Vec<String>,
    pub stream_id: StreamId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleStyled {
    pub subtitle_ass_file: String,
    pub stream_id: StreamId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoReframed {
    pub file_name_transformed: String,
    pub stream_id: StreamId,
}

/// Failure payload: the job identifier and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFailure {
    pub stream_id: StreamId,
}
