use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::domain::StreamId;

use super::stage_orchestrator::StageOrchestrator;
use super::task_envelope::StageTask;

pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 4;

/// Consumes validated stage tasks from the intake channel.
///
/// Tasks of different jobs run concurrently up to `max_concurrent`; tasks of
/// the same job run one at a time in arrival order.
pub struct TaskWorker {
    receiver: mpsc::Receiver<StageTask>,
    orchestrator: Arc<StageOrchestrator>,
    permits: Arc<Semaphore>,
    // Completion signal of the newest task per job. The sender is dropped
    // when that task finishes.
    last_task: HashMap<StreamId, oneshot::Receiver<()>>,
    cancel: CancellationToken,
}

impl TaskWorker {
    pub fn new(
        receiver: mpsc::Receiver<StageTask>,
        orchestrator: Arc<StageOrchestrator>,
        max_concurrent: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            orchestrator,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_task: HashMap::new(),
            cancel,
        }
    }

    /// Runs until the channel closes or the token is cancelled, then waits
    /// for in-flight tasks.
    pub async fn run(mut self) {
        tracing::info!("Task worker started");
        let mut in_flight = JoinSet::new();

        loop {
            let task = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Task worker cancelled");
                    break;
                }
                task = self.receiver.recv() => match task {
                    Some(task) => task,
                    None => {
                        tracing::info!("Task worker stopped: channel closed");
                        break;
                    }
                },
            };

            tracing::debug!(stream_id = %task.stream_id, task = %task.kind(), "Task received");

            let (done, done_rx) = oneshot::channel::<()>();
            let predecessor = self.last_task.insert(task.stream_id.clone(), done_rx);
            let permits = Arc::clone(&self.permits);
            let orchestrator = Arc::clone(&self.orchestrator);
            let cancel = self.cancel.clone();

            in_flight.spawn(async move {
                let _done = done;
                if let Some(predecessor) = predecessor {
                    // Err means the predecessor finished and dropped its sender.
                    let _ = predecessor.await;
                }
                // Taken after the predecessor so a waiting task holds no slot.
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                let stream_id = task.stream_id.clone();
                let kind = task.kind();
                // The orchestrator logs and reports the outcome itself unless
                // the stage panics, in which case the job still gets a failure.
                let stage_orchestrator = Arc::clone(&orchestrator);
                let stage = tokio::spawn(async move {
                    let _ = stage_orchestrator.run_task(task, &cancel).await;
                });
                if let Err(e) = stage.await {
                    tracing::error!(stream_id = %stream_id, task = %kind, error = %e, "Stage task panicked");
                    orchestrator.report_failure(&stream_id, kind).await;
                }
            });

            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "Stage task panicked");
                }
            }
            self.last_task
                .retain(|_, rx| matches!(rx.try_recv(), Err(oneshot::error::TryRecvError::Empty)));
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Stage task panicked");
            }
        }
        tracing::info!("Task worker drained");
    }
}
