#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use substream::application::ports::{
    DownloadError, DownloadedVideo, MediaToolError, MediaToolkit, NotifierError, ResultNotifier,
    TranscriptionEngine, TranscriptionError, VideoDownloader,
};
use substream::domain::{
    AudioChunk, ChunkIndex, ReframeDecision, ShadowMode, StageOutcome, StreamId, StyleConfig,
    TaskKind, TranscriptWord, VideoDimensions,
};

pub fn stream_id(raw: &str) -> StreamId {
    StreamId::parse(raw).unwrap()
}

pub fn index(i: u32) -> ChunkIndex {
    ChunkIndex::new(i).unwrap()
}

pub fn words(items: &[(&str, u64, u64)]) -> Vec<TranscriptWord> {
    items
        .iter()
        .map(|(text, start, end)| TranscriptWord::new(*text, *start, *end))
        .collect()
}

/// `count` evenly spaced words named `w1..`, 500 ms each.
pub fn numbered_words(count: usize) -> Vec<TranscriptWord> {
    (0..count as u64)
        .map(|i| TranscriptWord::new(format!("w{}", i + 1), i * 500, i * 500 + 400))
        .collect()
}

pub fn chunk(i: u32, file_name: &str) -> AudioChunk {
    AudioChunk::new(index(i), Duration::from_secs(300), file_name.into())
}

pub fn default_style() -> StyleConfig {
    StyleConfig {
        font_name: "Arial".to_string(),
        font_size: 16,
        primary_color: "#FFFFFF".to_string(),
        bold: false,
        italic: false,
        underline: false,
        outline_color: "#000000".to_string(),
        outline_thickness: 1,
        shadow: ShadowMode::None,
        shadow_color: None,
        vertical_alignment: 20.0,
    }
}

enum FakeTranscript {
    Words(Vec<TranscriptWord>),
    Failure,
}

struct Scripted {
    transcript: FakeTranscript,
    delay: Duration,
}

/// Scripted transcription keyed by audio file name. Tracks how many calls
/// overlap.
#[derive(Default)]
pub struct FakeTranscriptionEngine {
    scripted: HashMap<String, Scripted>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl FakeTranscriptionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(mut self, file_name: &str, words: Vec<TranscriptWord>, delay_ms: u64) -> Self {
        self.scripted.insert(
            file_name.to_string(),
            Scripted {
                transcript: FakeTranscript::Words(words),
                delay: Duration::from_millis(delay_ms),
            },
        );
        self
    }

    pub fn with_failure(mut self, file_name: &str, delay_ms: u64) -> Self {
        self.scripted.insert(
            file_name.to_string(),
            Scripted {
                transcript: FakeTranscript::Failure,
                delay: Duration::from_millis(delay_ms),
            },
        );
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TranscriptionEngine for FakeTranscriptionEngine {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<TranscriptWord>, TranscriptionError> {
        let name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(name.clone());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.max_active.fetch_max(now, Ordering::SeqCst);

        let Some(scripted) = self.scripted.get(&name) else {
            return Err(TranscriptionError::TranscriptionFailed(format!(
                "no script for {}",
                name
            )));
        };
        tokio::time::sleep(scripted.delay).await;
        match &scripted.transcript {
            FakeTranscript::Words(words) => Ok(words.clone()),
            FakeTranscript::Failure => Err(TranscriptionError::TranscriptionFailed(format!(
                "scripted failure for {}",
                name
            ))),
        }
    }
}

/// Media toolkit that writes placeholder files and reports fixed probes.
pub struct FakeMediaToolkit {
    pub duration: Duration,
    pub dimensions: VideoDimensions,
    pub cuts: Mutex<Vec<(Duration, Duration)>>,
    pub reframes: Mutex<Vec<ReframeDecision>>,
    pub probed_dimensions: AtomicUsize,
}

impl FakeMediaToolkit {
    pub fn new(duration: Duration, dimensions: VideoDimensions) -> Self {
        Self {
            duration,
            dimensions,
            cuts: Mutex::new(Vec::new()),
            reframes: Mutex::new(Vec::new()),
            probed_dimensions: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaToolkit for FakeMediaToolkit {
    async fn extract_normalized_audio(
        &self,
        video: &Path,
        output: &Path,
    ) -> Result<(), MediaToolError> {
        if !video.exists() {
            return Err(MediaToolError::Probe(format!("{} missing", video.display())));
        }
        tokio::fs::write(output, b"normalized wav").await.unwrap();
        Ok(())
    }

    async fn probe_duration(&self, _media: &Path) -> Result<Duration, MediaToolError> {
        Ok(self.duration)
    }

    async fn probe_dimensions(&self, _video: &Path) -> Result<VideoDimensions, MediaToolError> {
        self.probed_dimensions.fetch_add(1, Ordering::SeqCst);
        Ok(self.dimensions)
    }

    async fn cut_audio(
        &self,
        _audio: &Path,
        start: Duration,
        duration: Duration,
        output: &Path,
    ) -> Result<(), MediaToolError> {
        self.cuts.lock().unwrap().push((start, duration));
        tokio::fs::write(output, format!("chunk at {}s", start.as_secs()))
            .await
            .unwrap();
        Ok(())
    }

    async fn reframe(
        &self,
        _video: &Path,
        decision: &ReframeDecision,
        output: &Path,
    ) -> Result<(), MediaToolError> {
        if decision.pass_through {
            return Err(MediaToolError::PassThrough);
        }
        self.reframes.lock().unwrap().push(*decision);
        tokio::fs::write(output, b"reframed video").await.unwrap();
        Ok(())
    }
}

pub struct FakeDownloader {
    pub title: String,
    pub content: Vec<u8>,
    pub fail: bool,
}

impl FakeDownloader {
    pub fn new(title: &str, content: &[u8]) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_vec(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            title: String::new(),
            content: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl VideoDownloader for FakeDownloader {
    async fn download(&self, _url: &str, output: &Path) -> Result<DownloadedVideo, DownloadError> {
        if self.fail {
            return Err(DownloadError::Failed("video unavailable".to_string()));
        }
        tokio::fs::write(output, &self.content).await?;
        Ok(DownloadedVideo {
            title: self.title.clone(),
            size_bytes: self.content.len() as u64,
        })
    }
}

/// Downloader whose stage dies instead of returning.
pub struct PanickingDownloader;

#[async_trait]
impl VideoDownloader for PanickingDownloader {
    async fn download(&self, _url: &str, _output: &Path) -> Result<DownloadedVideo, DownloadError> {
        panic!("downloader crashed");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Success {
        endpoint: String,
        body: serde_json::Value,
    },
    Failure {
        endpoint: String,
        stream_id: String,
    },
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultNotifier for RecordingNotifier {
    async fn notify_success(&self, outcome: &StageOutcome) -> Result<(), NotifierError> {
        self.sent.lock().unwrap().push(Notification::Success {
            endpoint: outcome.task().success_endpoint().to_string(),
            body: serde_json::to_value(outcome).unwrap(),
        });
        Ok(())
    }

    async fn notify_failure(
        &self,
        task: TaskKind,
        stream_id: &StreamId,
    ) -> Result<(), NotifierError> {
        self.sent.lock().unwrap().push(Notification::Failure {
            endpoint: task.failure_endpoint(),
            stream_id: stream_id.to_string(),
        });
        Ok(())
    }
}
