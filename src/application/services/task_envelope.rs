use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ExtractSoundRequest, GenerateSubtitlesRequest, GetVideoRequest, StageRequest, StreamId,
    TaskKind, TransformSubtitleRequest, TransformVideoRequest,
};

/// Message delivered by the task queue: `{task_name, stream_id, stage_payload}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskEnvelope {
    pub task_name: TaskKind,
    pub stream_id: StreamId,
    #[serde(default)]
    pub stage_payload: serde_json::Value,
}

/// A validated envelope, ready for the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTask {
    pub stream_id: StreamId,
    pub request: StageRequest,
}

impl StageTask {
    pub fn new(stream_id: StreamId, request: StageRequest) -> Self {
        Self { stream_id, request }
    }

    pub fn kind(&self) -> TaskKind {
        self.request.kind()
    }
}

impl TaskEnvelope {
    pub fn new(task_name: TaskKind, stream_id: StreamId, stage_payload: serde_json::Value) -> Self {
        Self {
            task_name,
            stream_id,
            stage_payload,
        }
    }

    /// Decodes the payload against the schema of `task_name` and checks the
    /// values pipeline code relies on.
    pub fn validate(self) -> Result<StageTask, EnvelopeError> {
        let task = self.task_name;
        let request = match task {
            TaskKind::GetVideo => {
                let req: GetVideoRequest = decode(task, self.stage_payload)?;
                check_url(task, &req.url)?;
                StageRequest::GetVideo(req)
            }
            TaskKind::ExtractSound => {
                let req: ExtractSoundRequest = decode(task, self.stage_payload)?;
                check_file_name(task, "file_name", &req.file_name)?;
                StageRequest::ExtractSound(req)
            }
            TaskKind::GenerateSubtitles => {
                let req: GenerateSubtitlesRequest = decode(task, self.stage_payload)?;
                if req.audio_files.is_empty() {
                    return Err(EnvelopeError::invalid(task, "audio_files must not be empty"));
                }
                for chunk in &req.audio_files {
                    check_file_name(task, "audio_files", chunk.file_name())?;
                }
                StageRequest::GenerateSubtitles(req)
            }
            TaskKind::TransformSubtitle => {
                let req: TransformSubtitleRequest = decode(task, self.stage_payload)?;
                check_file_name(task, "subtitle_srt_file", &req.subtitle_srt_file)?;
                req.options
                    .validate()
                    .map_err(|reason| EnvelopeError::invalid(task, reason))?;
                StageRequest::TransformSubtitle(req)
            }
            TaskKind::TransformVideo => {
                let req: TransformVideoRequest = decode(task, self.stage_payload)?;
                check_file_name(task, "file_name", &req.file_name)?;
                StageRequest::TransformVideo(req)
            }
        };

        Ok(StageTask::new(self.stream_id, request))
    }
}

fn decode<T: DeserializeOwned>(task: TaskKind, payload: serde_json::Value) -> Result<T, EnvelopeError> {
    serde_json::from_value(payload).map_err(|e| EnvelopeError::Schema {
        task,
        reason: e.to_string(),
    })
}

fn check_url(task: TaskKind, raw: &str) -> Result<(), EnvelopeError> {
    let url = reqwest::Url::parse(raw)
        .map_err(|e| EnvelopeError::invalid(task, format!("url {:?}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(EnvelopeError::invalid(
            task,
            format!("url scheme must be http or https, got {}", other),
        )),
    }
}

/// Names are used both as object-store key suffixes and local file names.
fn check_file_name(task: TaskKind, field: &str, name: &str) -> Result<(), EnvelopeError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(EnvelopeError::invalid(
            task,
            format!("{} must be a plain file name, got {:?}", field, name),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("{task} payload does not match its schema: {reason}")]
    Schema { task: TaskKind, reason: String },
    #[error("{task} payload rejected: {reason}")]
    Invalid { task: TaskKind, reason: String },
}

impl EnvelopeError {
    fn invalid(task: TaskKind, reason: impl Into<String>) -> Self {
        EnvelopeError::Invalid {
            task,
            reason: reason.into(),
        }
    }
}
