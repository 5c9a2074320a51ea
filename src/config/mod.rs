use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Environment, File, FileFormat};
use std::fs;

/// Prefix for environment overrides, e.g. `QUIZFORGE_API__BASE_URL`.
pub const ENV_PREFIX: &str = "QUIZFORGE";

/// Configuration manager for loading and saving `QuizForge.yaml`.
///
/// Loading layers three sources, later ones winning:
/// - built-in defaults ([`AppConfig::default`])
/// - `QuizForge.yaml` in the config directory, if present
/// - `QUIZFORGE_<SECTION>__<KEY>` environment variables
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join("QuizForge.yaml"),
            config_dir,
        })
    }

    /// Load the layered configuration.
    pub fn load_config(&self) -> Result<AppConfig> {
        self.load_with_env(Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(&self, env: Environment) -> Result<AppConfig> {
        if self.config_path.exists() {
            tracing::info!("Loading config from {}", self.config_path);
        } else {
            tracing::warn!("Config file not found at {}, using defaults", self.config_path);
        }

        let layered = config::Config::builder()
            .add_source(File::new(self.config_path.as_str(), FileFormat::Yaml).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: AppConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        config
            .defaults
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid defaults in {}: {}", self.config_path, e))?;

        if config.api.timeout_secs == 0 {
            anyhow::bail!("Invalid api.timeout_secs in {}: must be at least 1", self.config_path);
        }

        Ok(config)
    }

    /// Save the configuration file.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Write the defaults on first run so users have a file to edit.
    pub fn ensure_config_file(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        self.save_config(&AppConfig::default())?;
        Ok(true)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
