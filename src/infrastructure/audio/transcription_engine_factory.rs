use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::assemblyai_engine::AssemblyAiEngine;
use super::openai_whisper_engine::OpenAiWhisperEngine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranscriptionProvider {
    AssemblyAi,
    OpenAi,
}

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn create(
        provider: TranscriptionProvider,
        model: Option<String>,
        api_key: Option<String>,
        base_url: Option<String>,
        poll_interval: Duration,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        let key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
            TranscriptionError::Configuration("transcription api_key required".to_string())
        })?;
        match provider {
            TranscriptionProvider::AssemblyAi => {
                let engine = AssemblyAiEngine::new(key, base_url)
                    .with_polling(poll_interval, Duration::from_secs(30 * 60));
                Ok(Arc::new(engine))
            }
            TranscriptionProvider::OpenAi => {
                Ok(Arc::new(OpenAiWhisperEngine::new(key, base_url, model)))
            }
        }
    }
}
