mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    LoggingSettings, MediaSettings, NotifierSettings, PipelineSettings, ServerSettings, Settings,
    SettingsError, StorageProviderSetting, StorageSettings, TranscriptionProviderSetting,
    TranscriptionSettings,
};
