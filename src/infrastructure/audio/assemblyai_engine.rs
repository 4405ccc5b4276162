use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::TranscriptWord;

const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Hosted transcription: upload, create a transcript with language
/// detection, then poll until it completes.
pub struct AssemblyAiEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    language_detection: bool,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    words: Option<Vec<AssemblyAiWord>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct AssemblyAiWord {
    text: String,
    start: u64,
    end: u64,
}

impl AssemblyAiEngine {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    async fn upload(&self, audio: Vec<u8>) -> Result<String, TranscriptionError> {
        let response = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .body(audio)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("upload: {}", e)))?;

        let upload: UploadResponse = read_json(response, "upload").await?;
        Ok(upload.upload_url)
    }

    async fn create_transcript(&self, audio_url: &str) -> Result<String, TranscriptionError> {
        let response = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&TranscriptRequest {
                audio_url,
                language_detection: true,
            })
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("transcript: {}", e)))?;

        let transcript: TranscriptResponse = read_json(response, "transcript").await?;
        Ok(transcript.id)
    }

    async fn poll(&self, id: &str) -> Result<Vec<AssemblyAiWord>, TranscriptionError> {
        let started = tokio::time::Instant::now();
        loop {
            let response = self
                .client
                .get(format!("{}/v2/transcript/{}", self.base_url, id))
                .header(reqwest::header::AUTHORIZATION, &self.api_key)
                .send()
                .await
                .map_err(|e| TranscriptionError::ApiRequestFailed(format!("poll: {}", e)))?;

            let transcript: TranscriptResponse = read_json(response, "poll").await?;
            match transcript.status.as_str() {
                "completed" => return Ok(transcript.words.unwrap_or_default()),
                "error" => {
                    return Err(TranscriptionError::TranscriptionFailed(
                        transcript
                            .error
                            .unwrap_or_else(|| "unknown error".to_string()),
                    ));
                }
                status => tracing::trace!(transcript_id = %id, status, "Transcript pending"),
            }

            if started.elapsed() >= self.poll_timeout {
                return Err(TranscriptionError::TranscriptionFailed(format!(
                    "transcript {} not completed after {:?}",
                    id, self.poll_timeout
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    step: &str,
) -> Result<T, TranscriptionError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(TranscriptionError::ApiRequestFailed(format!(
            "{} status {}: {}",
            step, status, body
        )));
    }
    response
        .json()
        .await
        .map_err(|e| TranscriptionError::ApiRequestFailed(format!("{} body: {}", step, e)))
}

#[async_trait]
impl TranscriptionEngine for AssemblyAiEngine {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<TranscriptWord>, TranscriptionError> {
        let audio = tokio::fs::read(audio_path)
            .await
            .map_err(|e| TranscriptionError::AudioUnreadable(format!("{}: {}", audio_path.display(), e)))?;

        tracing::debug!(bytes = audio.len(), "Uploading audio to AssemblyAI");
        let audio_url = self.upload(audio).await?;
        let id = self.create_transcript(&audio_url).await?;
        let words = self.poll(&id).await?;

        tracing::info!(transcript_id = %id, words = words.len(), "AssemblyAI transcription completed");

        Ok(words
            .into_iter()
            .map(|w| TranscriptWord::new(w.text, w.start, w.end))
            .collect())
    }
}
