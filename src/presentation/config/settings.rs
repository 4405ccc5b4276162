use std::path::PathBuf;
use std::time::Duration;

use config::{Config, File};
use serde::Deserialize;

use crate::application::services::{
    DEFAULT_FAN_OUT_WORKERS, DEFAULT_MAX_CONCURRENT_TASKS, DEFAULT_WINDOW, DEFAULT_WORDS_PER_CUE,
};
use crate::infrastructure::media::DEFAULT_DOWNLOAD_FORMAT;
use crate::infrastructure::observability::DEFAULT_FILTER;

use super::Environment;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub transcription: TranscriptionSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub notifier: NotifierSettings,
    #[serde(default)]
    pub media: MediaSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    #[default]
    Local,
    S3,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub provider: StorageProviderSetting,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
}

fn default_local_path() -> String {
    "./data/media".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProviderSetting::default(),
            local_path: default_local_path(),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProviderSetting {
    #[default]
    AssemblyAi,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    #[serde(default)]
    pub provider: TranscriptionProviderSetting,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    3000
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProviderSetting::default(),
            api_key: None,
            base_url: None,
            model: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl TranscriptionSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub chunk_window_seconds: u64,
    pub fan_out_workers: usize,
    pub words_per_cue: usize,
    pub work_dir: PathBuf,
    pub max_concurrent_tasks: usize,
    pub task_queue_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunk_window_seconds: DEFAULT_WINDOW.as_secs(),
            fan_out_workers: DEFAULT_FAN_OUT_WORKERS,
            words_per_cue: DEFAULT_WORDS_PER_CUE,
            work_dir: PathBuf::from("/tmp"),
            max_concurrent_tasks: DEFAULT_MAX_CONCURRENT_TASKS,
            task_queue_capacity: 100,
        }
    }
}

impl PipelineSettings {
    pub fn chunk_window(&self) -> Duration {
        Duration::from_secs(self.chunk_window_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotifierSettings {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub processor_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub ytdlp_path: String,
    pub download_format: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            ytdlp_path: "yt-dlp".to_string(),
            download_format: DEFAULT_DOWNLOAD_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_FILTER.to_string(),
            enable_json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration could not be loaded: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Settings {
    /// Layers `appsettings.<env>.toml` (optional) under `APP_`-prefixed
    /// environment variables, e.g. `APP_PIPELINE__FAN_OUT_WORKERS=8`.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let configuration = Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = configuration.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let pipeline = &self.pipeline;
        if pipeline.chunk_window_seconds == 0 {
            return Err(SettingsError::Invalid(
                "pipeline.chunk_window_seconds must be positive".into(),
            ));
        }
        if pipeline.fan_out_workers == 0 {
            return Err(SettingsError::Invalid(
                "pipeline.fan_out_workers must be positive".into(),
            ));
        }
        if pipeline.words_per_cue == 0 {
            return Err(SettingsError::Invalid(
                "pipeline.words_per_cue must be positive".into(),
            ));
        }
        if pipeline.max_concurrent_tasks == 0 || pipeline.task_queue_capacity == 0 {
            return Err(SettingsError::Invalid(
                "pipeline.max_concurrent_tasks and task_queue_capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}
