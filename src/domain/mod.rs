mod audio_chunk;
mod job;
mod job_stage;
pub mod reframe;
mod stage_outcome;
mod stage_request;
mod storage_path;
mod stream_id;
pub mod style_config;
pub mod subtitle_cue;
mod subtitle_track;
mod task_kind;
mod transcript_word;

pub use audio_chunk::{
    AudioChunk, ChunkIndex, ChunkWindow, chunk_audio_file_name, chunk_subtitle_file_name,
};
pub use job::Job;
pub use job_stage::JobStage;
pub use reframe::{
    CropRect, EncodeParameters, ReframeDecision, ReframeMode, ReframeTarget, ScaleTarget,
    VideoDimensions,
};
pub use stage_outcome::{
    SoundExtracted, StageFailure, StageOutcome, SubtitleStyled, SubtitlesGenerated,
    VideoDownloaded, VideoReframed,
};
pub use stage_request::{
    AudioChunkRef, ExtractSoundRequest, GenerateSubtitlesRequest, GetVideoRequest,
    ReframeOptions, StageRequest, TransformSubtitleRequest, TransformVideoRequest,
};
pub use storage_path::StoragePath;
pub use stream_id::{InvalidStreamId, StreamId};
pub use style_config::{ShadowMode, StyleConfig, to_ass_color};
pub use subtitle_cue::{SubtitleCue, SubtitleError};
pub use subtitle_track::SubtitleTrack;
pub use task_kind::TaskKind;
pub use transcript_word::TranscriptWord;
