use chrono::{DateTime, Utc};

use super::{JobStage, StreamId, TaskKind};

#[derive(Debug, Clone)]
pub struct Job {
    pub stream_id: StreamId,
    pub stages: Vec<JobStage>,
    pub failed_task: Option<TaskKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(stream_id: StreamId) -> Self {
        let now = Utc::now();
        Self {
            stream_id,
            stages: Vec::new(),
            failed_task: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn latest_stage(&self) -> Option<JobStage> {
        self.stages.last().copied()
    }

    pub fn has_reached(&self, stage: JobStage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn record_stage(&mut self, stage: JobStage) {
        if !self.has_reached(stage) {
            self.stages.push(stage);
        }
        self.failed_task = None;
        self.updated_at = Utc::now();
    }

    pub fn record_failure(&mut self, task: TaskKind) {
        self.failed_task = Some(task);
        self.updated_at = Utc::now();
    }
}
