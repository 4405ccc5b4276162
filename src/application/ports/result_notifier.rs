use async_trait::async_trait;

use crate::domain::{StageOutcome, StreamId, TaskKind};

/// External results collaborator informed once per stage run.
#[async_trait]
pub trait ResultNotifier: Send + Sync {
    async fn notify_success(&self, outcome: &StageOutcome) -> Result<(), NotifierError>;

    async fn notify_failure(&self, task: TaskKind, stream_id: &StreamId)
    -> Result<(), NotifierError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("callback request failed: {0}")]
    RequestFailed(String),
    #[error("callback rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
