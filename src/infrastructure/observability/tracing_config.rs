/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,
}

pub const DEFAULT_FILTER: &str = "info,substream=debug,tower_http=debug";

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, json_format: bool, level: Option<&str>) -> Self {
        Self {
            environment: environment.into(),
            json_format,
            default_filter: level
                .filter(|l| !l.trim().is_empty())
                .map(String::from)
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        }
    }
}
