use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobStage, StreamId, TaskKind};

/// Process-local job progress. Lost on restart.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<StreamId, Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn get_by_id(&self, id: &StreamId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn record_stage(&self, id: &StreamId, stage: JobStage) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        jobs.entry(id.clone())
            .or_insert_with(|| Job::new(id.clone()))
            .record_stage(stage);
        Ok(())
    }

    async fn record_failure(&self, id: &StreamId, task: TaskKind) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        jobs.entry(id.clone())
            .or_insert_with(|| Job::new(id.clone()))
            .record_failure(task);
        Ok(())
    }
}
