use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::{AudioChunk, ChunkIndex, SubtitleCue};

use super::cue_builder::CueBuilder;

pub const DEFAULT_FAN_OUT_WORKERS: usize = 5;

/// Locally-timed cues per chunk, keyed (and therefore ordered) by chunk index.
pub type ChunkCues = BTreeMap<ChunkIndex, Vec<SubtitleCue>>;

type ChunkQueue = Arc<Mutex<VecDeque<AudioChunk>>>;
type ResultMap = Arc<Mutex<ChunkCues>>;

/// Transcribes chunks with a fixed pool of workers pulling from one queue.
///
/// Results are keyed by chunk index, never by completion order. The first
/// failing chunk cancels the remaining work and the whole run fails.
pub struct TranscriptionFanOut {
    engine: Arc<dyn TranscriptionEngine>,
    workers: usize,
    cue_builder: CueBuilder,
}

impl TranscriptionFanOut {
    pub fn new(engine: Arc<dyn TranscriptionEngine>, workers: usize, cue_builder: CueBuilder) -> Self {
        Self {
            engine,
            workers: workers.max(1),
            cue_builder,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn run(
        &self,
        chunks: Vec<AudioChunk>,
        cancel: &CancellationToken,
    ) -> Result<ChunkCues, FanOutError> {
        let mut seen = HashSet::with_capacity(chunks.len());
        if let Some(dup) = chunks.iter().find(|c| !seen.insert(c.index)) {
            return Err(FanOutError::InvalidInput(format!(
                "chunk index {} appears more than once",
                dup.index
            )));
        }

        let expected = chunks.len();
        let queue: ChunkQueue = Arc::new(Mutex::new(VecDeque::from(chunks)));
        let results: ResultMap = Arc::new(Mutex::new(BTreeMap::new()));
        let cancel = cancel.child_token();

        tracing::debug!(chunks = expected, workers = self.workers, "Starting transcription fan-out");

        let mut pool = JoinSet::new();
        for worker_id in 0..self.workers {
            pool.spawn(run_worker(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&results),
                Arc::clone(&self.engine),
                self.cue_builder,
                cancel.clone(),
            ));
        }

        let mut first_error: Option<FanOutError> = None;
        while let Some(joined) = pool.join_next().await {
            let outcome = joined.unwrap_or_else(|e| Err(FanOutError::WorkerPanicked(e.to_string())));
            if let Err(e) = outcome {
                if first_error.is_none() {
                    tracing::warn!(error = %e, "Aborting fan-out on first failure");
                    cancel.cancel();
                    first_error = Some(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let results = std::mem::take(&mut *results.lock().await);
        if results.len() != expected {
            return Err(FanOutError::Cancelled);
        }

        tracing::info!(chunks = results.len(), "Transcription fan-out completed");
        Ok(results)
    }
}

async fn run_worker(
    worker_id: usize,
    queue: ChunkQueue,
    results: ResultMap,
    engine: Arc<dyn TranscriptionEngine>,
    cue_builder: CueBuilder,
    cancel: CancellationToken,
) -> Result<(), FanOutError> {
    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let next = queue.lock().await.pop_front();
        let Some(chunk) = next else {
            return Ok(());
        };

        tracing::debug!(worker = worker_id, chunk = %chunk.index, "Transcribing chunk");

        let words = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            words = engine.transcribe(&chunk.path) => words,
        };

        let words = words.map_err(|source| FanOutError::ChunkFailed {
            index: chunk.index,
            source,
        })?;

        let cues = cue_builder.build(&words);
        tracing::debug!(
            worker = worker_id,
            chunk = %chunk.index,
            words = words.len(),
            cues = cues.len(),
            "Chunk transcribed"
        );

        results.lock().await.insert(chunk.index, cues);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FanOutError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("chunk {index} failed: {source}")]
    ChunkFailed {
        index: ChunkIndex,
        #[source]
        source: TranscriptionError,
    },
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
    #[error("fan-out cancelled")]
    Cancelled,
}
