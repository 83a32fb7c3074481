//! Service settings.
//!
//! Loaded once at startup from a TOML file, then patched with
//! `SENTIMENT_BACKEND_*` environment overrides and validated. The resulting
//! [`Settings`] is immutable and passed by value into [`crate::init::AppContext`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::inference::vocabulary::CANONICAL_FILENAME;
use crate::inference::{ModelArchitecture, ModelSpec};
use crate::SentimentError;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SENTIMENT_BACKEND_";

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "SENTIMENT_BACKEND_CONFIG";

const LOCAL_CONFIG_FILE: &str = "sentiment.toml";

fn default_app_name() -> String {
    "sentiment-backend".to_string()
}

fn default_environment() -> String {
    "local".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_weights_path() -> PathBuf {
    PathBuf::from("artifacts/imdb_dense/model.safetensors")
}

fn default_max_length() -> usize {
    256
}

fn default_vocab_size() -> usize {
    10_000
}

fn default_history() -> usize {
    50
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            environment: default_environment(),
            server: ServerSettings::default(),
            model: ModelSettings::default(),
            metrics: MetricsSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Model resources and shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Trained safetensors artifact. Must exist.
    #[serde(default = "default_weights_path")]
    pub imdb_weights_path: PathBuf,
    #[serde(default = "default_max_length")]
    pub imdb_max_length: usize,
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,
    /// Custom token → index file, used verbatim when present.
    #[serde(default)]
    pub imdb_word_index_path: Option<PathBuf>,
    /// Canonical word-rank list. Defaults to `imdb_word_index.json` next to the artifact.
    #[serde(default)]
    pub canonical_word_index_path: Option<PathBuf>,
    #[serde(default)]
    pub architecture: ModelArchitecture,
    /// Fail construction instead of falling back to keyword scoring.
    #[serde(default)]
    pub strict: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            imdb_weights_path: default_weights_path(),
            imdb_max_length: default_max_length(),
            vocab_size: default_vocab_size(),
            imdb_word_index_path: None,
            canonical_word_index_path: None,
            architecture: ModelArchitecture::default(),
            strict: false,
        }
    }
}

impl ModelSettings {
    /// Canonical word-rank list location.
    pub fn canonical_vocabulary_path(&self) -> PathBuf {
        match &self.canonical_word_index_path {
            Some(path) => path.clone(),
            None => self
                .imdb_weights_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(CANONICAL_FILENAME),
        }
    }

    pub fn model_spec(&self) -> ModelSpec {
        ModelSpec {
            vocab_size: self.vocab_size,
            max_length: self.imdb_max_length,
            architecture: self.architecture.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Number of recent predictions kept for the metrics endpoint.
    #[serde(default = "default_history")]
    pub history: usize,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            history: default_history(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, SentimentError> {
        toml::from_str(contents).map_err(|e| SentimentError::Config(e.to_string()))
    }

    /// Apply `SENTIMENT_BACKEND_*` overrides from a variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SentimentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = var("APP_NAME") {
            self.app_name = value;
        }
        if let Some(value) = var("ENVIRONMENT") {
            self.environment = value;
        }
        if let Some(value) = var("HOST") {
            self.server.host = value;
        }
        if let Some(value) = var("PORT") {
            self.server.port = parse_override("PORT", &value)?;
        }
        if let Some(value) = var("IMDB_WEIGHTS_PATH") {
            self.model.imdb_weights_path = PathBuf::from(value);
        }
        if let Some(value) = var("IMDB_MAX_LENGTH") {
            self.model.imdb_max_length = parse_override("IMDB_MAX_LENGTH", &value)?;
        }
        if let Some(value) = var("IMDB_WORD_INDEX_PATH") {
            self.model.imdb_word_index_path = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), SentimentError> {
        if self.model.imdb_max_length == 0 {
            return Err(SentimentError::Config(
                "model.imdb_max_length must be positive".to_string(),
            ));
        }
        if self.model.vocab_size == 0 {
            return Err(SentimentError::Config(
                "model.vocab_size must be positive".to_string(),
            ));
        }
        if self.metrics.history == 0 {
            return Err(SentimentError::Config(
                "metrics.history must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, SentimentError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        SentimentError::Config(format!("Invalid {}{}='{}': {}", ENV_PREFIX, name, value, e))
    })
}

/// Find the settings file to read, if any.
///
/// Priority: explicit path > `./sentiment.toml` > `{config_dir}/sentiment-service/settings.toml`.
/// An explicit path is returned even when missing so the caller can report it.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = Path::new(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local.to_path_buf());
    }

    dirs::config_dir()
        .map(|dir| dir.join("sentiment-service").join("settings.toml"))
        .filter(|path| path.is_file())
}

/// Load settings from `path` (if any) with overrides taken from `env`.
pub fn load_settings_with(
    path: Option<&Path>,
    env: &HashMap<String, String>,
) -> Result<Settings, SentimentError> {
    let mut settings = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                SentimentError::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let settings = Settings::from_toml(&contents).map_err(|e| {
                SentimentError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            info!("Loaded settings from {}", path.display());
            settings
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.apply_overrides(|name| env.get(name).cloned())?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings for the running process.
///
/// File resolution per [`resolve_config_path`], then process environment overrides.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, SentimentError> {
    let path = resolve_config_path(explicit);
    let env: HashMap<String, String> = std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();
    load_settings_with(path.as_deref(), &env)
}
