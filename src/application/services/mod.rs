pub mod aspect_reframer;
pub mod chunk_splitter;
mod cue_builder;
mod stage_orchestrator;
mod style_compiler;
mod task_envelope;
mod task_worker;
mod timestamp_merger;
mod transcription_fan_out;

pub use aspect_reframer::ReframeError;
pub use chunk_splitter::{ChunkSplitError, DEFAULT_WINDOW, split_windows};
pub use cue_builder::{CueBuilder, DEFAULT_WORDS_PER_CUE};
pub use stage_orchestrator::{
    PipelineConfig, PipelineContext, PipelineRequest, StageError, StageOrchestrator,
};
pub use style_compiler::{StyleCompileError, StyleCompiler};
pub use task_envelope::{EnvelopeError, StageTask, TaskEnvelope};
pub use task_worker::{DEFAULT_MAX_CONCURRENT_TASKS, TaskWorker};
pub use timestamp_merger::{ChunkTranscript, merge_chunks};
pub use transcription_fan_out::{
    ChunkCues, DEFAULT_FAN_OUT_WORKERS, FanOutError, TranscriptionFanOut,
};
