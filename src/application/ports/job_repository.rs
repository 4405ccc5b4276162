use async_trait::async_trait;

use crate::domain::{Job, JobStage, StreamId, TaskKind};

use super::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn get_by_id(&self, id: &StreamId) -> Result<Option<Job>, RepositoryError>;

    /// Creates the job on first use.
    async fn record_stage(&self, id: &StreamId, stage: JobStage) -> Result<(), RepositoryError>;

    async fn record_failure(&self, id: &StreamId, task: TaskKind) -> Result<(), RepositoryError>;
}
