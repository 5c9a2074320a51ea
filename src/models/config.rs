use crate::models::study::GenerationOptions;
use serde::{Deserialize, Serialize};

/// Application configuration from `QuizForge.yaml`.
///
/// Every section falls back to its defaults, so a partial file (or none at all)
/// is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub defaults: GenerationOptions,
    pub logging: LoggingSettings,
}

/// Where the study backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,

    /// Per-request timeout. Generation calls can take a while on large inputs.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub directory: String,
    pub debug: bool,
    /// Mirror logs to stderr.
    pub console: bool,
    /// Write the log file as JSON lines.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            debug: false,
            console: false,
            json: false,
        }
    }
}
