use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{
    DownloadError, JobRepository, MediaStore, MediaStoreError, MediaToolError, MediaToolkit,
    ResultNotifier, TranscriptionEngine, VideoDownloader,
};
use crate::domain::{
    AudioChunk, AudioChunkRef, ChunkIndex, ExtractSoundRequest, GenerateSubtitlesRequest,
    GetVideoRequest, ReframeOptions, SoundExtracted, StageOutcome, StageRequest, StoragePath,
    StreamId, StyleConfig, SubtitleStyled, SubtitleTrack, SubtitlesGenerated, TaskKind,
    TransformSubtitleRequest, TransformVideoRequest, VideoDownloaded, VideoReframed,
    chunk_audio_file_name, chunk_subtitle_file_name,
};

use super::aspect_reframer::{self, ReframeError};
use super::chunk_splitter::{ChunkSplitError, split_windows};
use super::cue_builder::CueBuilder;
use super::style_compiler::{StyleCompileError, StyleCompiler};
use super::task_envelope::StageTask;
use super::timestamp_merger::{ChunkTranscript, merge_chunks};
use super::transcription_fan_out::{FanOutError, TranscriptionFanOut};

const VIDEO_MIME_TYPE: &str = "video/mp4";

/// External collaborators, built once per worker process and shared by
/// every stage run.
#[derive(Clone)]
pub struct PipelineContext {
    pub store: Arc<dyn MediaStore>,
    pub transcription_engine: Arc<dyn TranscriptionEngine>,
    pub media_toolkit: Arc<dyn MediaToolkit>,
    pub downloader: Arc<dyn VideoDownloader>,
    pub notifier: Arc<dyn ResultNotifier>,
    pub job_repository: Arc<dyn JobRepository>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunk_window: Duration,
    pub fan_out_workers: usize,
    pub words_per_cue: usize,
    pub work_dir: PathBuf,
}

/// Inputs of a full job run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub url: String,
    pub style: StyleConfig,
    pub reframe: ReframeOptions,
}

/// Runs stage tasks and reports each outcome to the result collaborator.
///
/// A failed stage is reported with the job id only and never retried.
pub struct StageOrchestrator {
    ctx: PipelineContext,
    config: PipelineConfig,
    fan_out: TranscriptionFanOut,
    style_compiler: StyleCompiler,
}

impl StageOrchestrator {
    pub fn new(ctx: PipelineContext, config: PipelineConfig) -> Self {
        let fan_out = TranscriptionFanOut::new(
            Arc::clone(&ctx.transcription_engine),
            config.fan_out_workers,
            CueBuilder::new(config.words_per_cue),
        );
        Self {
            ctx,
            config,
            fan_out,
            style_compiler: StyleCompiler::default(),
        }
    }

    pub fn job_repository(&self) -> &Arc<dyn JobRepository> {
        &self.ctx.job_repository
    }

    /// Runs one stage, records the job stage and notifies success or failure.
    pub async fn run_task(
        &self,
        task: StageTask,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome, StageError> {
        let kind = task.kind();
        let stream_id = task.stream_id;
        let span = tracing::info_span!("stage", stream_id = %stream_id, task = %kind);

        async {
            tracing::info!("Processing stage");
            match self.execute(&stream_id, task.request, cancel).await {
                Ok(outcome) => {
                    for stage in outcome.stages() {
                        tracing::debug!(stage = %stage, "Job stage transition");
                        if let Err(e) = self.ctx.job_repository.record_stage(&stream_id, *stage).await {
                            tracing::warn!(error = %e, "Failed to record job stage");
                        }
                    }
                    tracing::info!("Sending success result");
                    if let Err(e) = self.ctx.notifier.notify_success(&outcome).await {
                        tracing::warn!(error = %e, "Failed to deliver success result");
                    }
                    Ok(outcome)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Stage failed");
                    self.report_failure(&stream_id, kind).await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Records the failed stage on the job and sends its failure result.
    /// Also used when a stage task dies without returning.
    pub async fn report_failure(&self, stream_id: &StreamId, kind: TaskKind) {
        if let Err(e) = self.ctx.job_repository.record_failure(stream_id, kind).await {
            tracing::warn!(error = %e, "Failed to record job failure");
        }
        if let Err(e) = self.ctx.notifier.notify_failure(kind, stream_id).await {
            tracing::warn!(error = %e, "Failed to deliver failure result");
        }
    }

    /// Sequences download, chunking, transcription + merge and styling, then
    /// reframing, stopping at the first failed stage.
    pub async fn run_pipeline(
        &self,
        stream_id: &StreamId,
        request: PipelineRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<StageOutcome>, StageError> {
        let mut outcomes = Vec::with_capacity(5);

        let downloaded = self
            .run_task(
                StageTask::new(
                    stream_id.clone(),
                    StageRequest::GetVideo(GetVideoRequest { url: request.url }),
                ),
                cancel,
            )
            .await?;
        let video_file = match &downloaded {
            StageOutcome::VideoDownloaded(v) => v.file_name.clone(),
            _ => format!("{}.mp4", stream_id),
        };
        outcomes.push(downloaded);

        let extracted = self
            .run_task(
                StageTask::new(
                    stream_id.clone(),
                    StageRequest::ExtractSound(ExtractSoundRequest {
                        file_name: video_file.clone(),
                    }),
                ),
                cancel,
            )
            .await?;
        let audio_files = match &extracted {
            StageOutcome::SoundExtracted(s) => s.audio_files.clone(),
            _ => Vec::new(),
        };
        outcomes.push(extracted);

        let generated = self
            .run_task(
                StageTask::new(
                    stream_id.clone(),
                    StageRequest::GenerateSubtitles(GenerateSubtitlesRequest { audio_files }),
                ),
                cancel,
            )
            .await?;
        let srt_file = match &generated {
            StageOutcome::SubtitlesGenerated(g) => g.subtitle_srt_file.clone(),
            _ => format!("{}.srt", stream_id),
        };
        outcomes.push(generated);

        let styled = self
            .run_task(
                StageTask::new(
                    stream_id.clone(),
                    StageRequest::TransformSubtitle(TransformSubtitleRequest {
                        subtitle_srt_file: srt_file,
                        options: request.style,
                    }),
                ),
                cancel,
            )
            .await?;
        outcomes.push(styled);

        let reframed = self
            .run_task(
                StageTask::new(
                    stream_id.clone(),
                    StageRequest::TransformVideo(TransformVideoRequest {
                        file_name: video_file,
                        options: request.reframe,
                    }),
                ),
                cancel,
            )
            .await?;
        outcomes.push(reframed);

        Ok(outcomes)
    }

    async fn execute(
        &self,
        stream_id: &StreamId,
        request: StageRequest,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome, StageError> {
        match request {
            StageRequest::GetVideo(req) => self.get_video(stream_id, req).await,
            StageRequest::ExtractSound(req) => self.extract_sound(stream_id, req).await,
            StageRequest::GenerateSubtitles(req) => {
                self.generate_subtitles(stream_id, req, cancel).await
            }
            StageRequest::TransformSubtitle(req) => self.transform_subtitle(stream_id, req).await,
            StageRequest::TransformVideo(req) => self.transform_video(stream_id, req).await,
        }
    }

    async fn get_video(
        &self,
        stream_id: &StreamId,
        req: GetVideoRequest,
    ) -> Result<StageOutcome, StageError> {
        let workspace = self.workspace(stream_id)?;
        let file_name = format!("{}.mp4", stream_id);
        let local = workspace.path().join(&file_name);

        let video = self
            .ctx
            .downloader
            .download(&req.url, &local)
            .await
            .map_err(StageError::Download)?;

        self.ctx
            .store
            .upload_file(&StoragePath::new(stream_id, &file_name), &local)
            .await
            .map_err(StageError::Storage)?;

        Ok(StageOutcome::VideoDownloaded(VideoDownloaded {
            file_name,
            original_file_name: format!("{}.mp4", video.title),
            mime_type: VIDEO_MIME_TYPE.to_string(),
            size: video.size_bytes,
            stream_id: stream_id.clone(),
        }))
    }

    async fn extract_sound(
        &self,
        stream_id: &StreamId,
        req: ExtractSoundRequest,
    ) -> Result<StageOutcome, StageError> {
        let workspace = self.workspace(stream_id)?;
        let video = workspace.path().join(&req.file_name);
        self.ctx
            .store
            .download_file(&StoragePath::new(stream_id, &req.file_name), &video)
            .await
            .map_err(StageError::Storage)?;

        let audio = workspace.path().join(format!("{}.normalized.wav", stream_id));
        let toolkit = &self.ctx.media_toolkit;
        toolkit
            .extract_normalized_audio(&video, &audio)
            .await
            .map_err(StageError::MediaTool)?;
        let duration = toolkit
            .probe_duration(&audio)
            .await
            .map_err(StageError::MediaTool)?;

        let windows =
            split_windows(duration, self.config.chunk_window).map_err(StageError::Chunking)?;

        let mut audio_files = Vec::with_capacity(windows.len());
        for window in windows {
            let name = chunk_audio_file_name(stream_id, window.index);
            let chunk_path = workspace.path().join(&name);
            toolkit
                .cut_audio(&audio, window.start_offset, window.duration, &chunk_path)
                .await
                .map_err(StageError::MediaTool)?;
            self.ctx
                .store
                .upload_file(&StoragePath::audio_chunk(stream_id, &name), &chunk_path)
                .await
                .map_err(StageError::Storage)?;
            tokio::fs::remove_file(&chunk_path)
                .await
                .map_err(StageError::Workspace)?;
            audio_files.push(AudioChunkRef::indexed(window.index, name));
        }

        tracing::debug!(chunks = audio_files.len(), "Audio chunks uploaded");

        Ok(StageOutcome::SoundExtracted(SoundExtracted {
            audio_files,
            stream_id: stream_id.clone(),
        }))
    }

    async fn generate_subtitles(
        &self,
        stream_id: &StreamId,
        req: GenerateSubtitlesRequest,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome, StageError> {
        let workspace = self.workspace(stream_id)?;
        let resolved = resolve_chunk_indices(&req.audio_files)?;

        let mut chunks = Vec::with_capacity(resolved.len());
        for chunk in &resolved {
            let local = workspace.path().join(&chunk.file_name);
            self.ctx
                .store
                .download_file(&StoragePath::audio_chunk(stream_id, &chunk.file_name), &local)
                .await
                .map_err(StageError::Storage)?;
            chunks.push(AudioChunk::new(chunk.index, self.config.chunk_window, local));
        }

        let results = self
            .fan_out
            .run(chunks, cancel)
            .await
            .map_err(StageError::Transcription)?;

        let explicit: HashMap<ChunkIndex, bool> =
            resolved.iter().map(|c| (c.index, c.explicit)).collect();

        let mut subtitle_srt_files = Vec::with_capacity(results.len());
        let mut transcripts = Vec::with_capacity(results.len());
        for (index, cues) in results {
            let name = chunk_subtitle_file_name(stream_id, index);
            let local_track = SubtitleTrack::new(cues);
            self.ctx
                .store
                .put(
                    &StoragePath::chunk_subtitles(stream_id, &name),
                    Bytes::from(local_track.to_srt()),
                )
                .await
                .map_err(StageError::Storage)?;
            subtitle_srt_files.push(name);

            let known = explicit.get(&index).copied().unwrap_or(true);
            transcripts.push(ChunkTranscript::new(
                known.then_some(index),
                local_track.into_cues(),
            ));
        }

        let merged = merge_chunks(transcripts, self.config.chunk_window);
        let subtitle_srt_file = format!("{}.srt", stream_id);
        self.ctx
            .store
            .put(
                &StoragePath::new(stream_id, &subtitle_srt_file),
                Bytes::from(merged.to_srt()),
            )
            .await
            .map_err(StageError::Storage)?;

        tracing::debug!(cues = merged.len(), "Merged subtitle track uploaded");

        Ok(StageOutcome::SubtitlesGenerated(SubtitlesGenerated {
            subtitle_srt_file,
            subtitle_srt_files,
            stream_id: stream_id.clone(),
        }))
    }

    async fn transform_subtitle(
        &self,
        stream_id: &StreamId,
        req: TransformSubtitleRequest,
    ) -> Result<StageOutcome, StageError> {
        let data = self
            .ctx
            .store
            .get(&StoragePath::new(stream_id, &req.subtitle_srt_file))
            .await
            .map_err(StageError::Storage)?;
        let srt = String::from_utf8(data.to_vec())
            .map_err(|e| StageError::InvalidInput(format!("subtitles are not utf-8: {}", e)))?;

        let styled = self
            .style_compiler
            .compile_srt(&srt, &req.options)
            .map_err(StageError::Style)?;

        let subtitle_ass_file = replace_extension(&req.subtitle_srt_file, ".srt", ".ass");
        self.ctx
            .store
            .put(
                &StoragePath::new(stream_id, &subtitle_ass_file),
                Bytes::from(styled),
            )
            .await
            .map_err(StageError::Storage)?;

        Ok(StageOutcome::SubtitleStyled(SubtitleStyled {
            subtitle_ass_file,
            stream_id: stream_id.clone(),
        }))
    }

    async fn transform_video(
        &self,
        stream_id: &StreamId,
        req: TransformVideoRequest,
    ) -> Result<StageOutcome, StageError> {
        let source_key = StoragePath::new(stream_id, &req.file_name);
        let file_name_transformed = replace_extension(&req.file_name, ".mp4", ".transformed.mp4");
        let target_key = StoragePath::new(stream_id, &file_name_transformed);
        let outcome = StageOutcome::VideoReframed(VideoReframed {
            file_name_transformed: file_name_transformed.clone(),
            stream_id: stream_id.clone(),
        });

        let Some(target) = req.options.video_format.target() else {
            tracing::debug!("Original format requested, copying source");
            self.ctx
                .store
                .copy(&source_key, &target_key)
                .await
                .map_err(StageError::Storage)?;
            return Ok(outcome);
        };

        let workspace = self.workspace(stream_id)?;
        let source = workspace.path().join(&req.file_name);
        self.ctx
            .store
            .download_file(&source_key, &source)
            .await
            .map_err(StageError::Storage)?;

        let dimensions = self
            .ctx
            .media_toolkit
            .probe_dimensions(&source)
            .await
            .map_err(StageError::MediaTool)?;
        let decision = aspect_reframer::decide(dimensions, target).map_err(StageError::Reframe)?;

        let upload_from = if decision.pass_through {
            tracing::debug!(source = %dimensions, "Source already fits, stream copy");
            source
        } else {
            let output = workspace.path().join(&file_name_transformed);
            self.ctx
                .media_toolkit
                .reframe(&source, &decision, &output)
                .await
                .map_err(StageError::MediaTool)?;
            tracing::debug!(
                source = %dimensions,
                output = %decision.output_dimensions(dimensions),
                "Video reframed"
            );
            output
        };

        self.ctx
            .store
            .upload_file(&target_key, &upload_from)
            .await
            .map_err(StageError::Storage)?;

        Ok(outcome)
    }

    /// Scratch directory removed when the stage returns.
    fn workspace(&self, stream_id: &StreamId) -> Result<TempDir, StageError> {
        std::fs::create_dir_all(&self.config.work_dir).map_err(StageError::Workspace)?;
        tempfile::Builder::new()
            .prefix(&format!("{}-", stream_id))
            .tempdir_in(&self.config.work_dir)
            .map_err(StageError::Workspace)
    }
}

#[derive(Debug)]
struct ResolvedChunk {
    index: ChunkIndex,
    file_name: String,
    explicit: bool,
}

/// Gives every referenced chunk an index. References whose index is neither
/// explicit nor recoverable from the file name are numbered after the last
/// known index, in the order they were listed.
fn resolve_chunk_indices(refs: &[AudioChunkRef]) -> Result<Vec<ResolvedChunk>, StageError> {
    let max_known = refs.iter().filter_map(AudioChunkRef::index).max();
    let mut next_unknown = match max_known {
        Some(index) => index.next(),
        None => Some(ChunkIndex::FIRST),
    };

    let mut seen = std::collections::HashSet::with_capacity(refs.len());
    let mut resolved = Vec::with_capacity(refs.len());
    for chunk in refs {
        let (index, explicit) = match chunk.index() {
            Some(index) => (index, true),
            None => {
                tracing::warn!(
                    file_name = chunk.file_name(),
                    "Chunk index unknown, ordering it last"
                );
                let index = next_unknown.ok_or_else(|| {
                    StageError::InvalidInput(format!(
                        "no chunk index left for {} after the last known index",
                        chunk.file_name()
                    ))
                })?;
                next_unknown = index.next();
                (index, false)
            }
        };
        if !seen.insert(index) {
            return Err(StageError::InvalidInput(format!(
                "chunk index {} referenced more than once",
                index
            )));
        }
        resolved.push(ResolvedChunk {
            index,
            file_name: chunk.file_name().to_string(),
            explicit,
        });
    }
    Ok(resolved)
}

fn replace_extension(file_name: &str, from: &str, to: &str) -> String {
    match file_name.strip_suffix(from) {
        Some(stem) => format!("{}{}", stem, to),
        None => format!("{}{}", file_name, to),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("storage: {0}")]
    Storage(MediaStoreError),
    #[error("download: {0}")]
    Download(DownloadError),
    #[error("media tool: {0}")]
    MediaTool(MediaToolError),
    #[error("chunking: {0}")]
    Chunking(ChunkSplitError),
    #[error("transcription: {0}")]
    Transcription(FanOutError),
    #[error("style compile: {0}")]
    Style(StyleCompileError),
    #[error("reframe: {0}")]
    Reframe(ReframeError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("workspace: {0}")]
    Workspace(std::io::Error),
}
