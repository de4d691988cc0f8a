use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

use crate::summarization::segments::DEFAULT_MAX_WORDS;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Model provider configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Summarization pipeline configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Model provider configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelConfig {
    /// Model repository identifier (e.g., "google-t5/t5-base")
    #[serde(default = "default_model_repo")]
    pub repo: String,

    /// Repository revision (branch, tag or commit)
    #[serde(default = "default_model_revision")]
    pub revision: String,

    /// Base URL of the model repository
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,

    /// Local directory for cached model files (platform cache dir when unset)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum prompt length in tokens; longer prompts are truncated
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,

    /// Never use an accelerator, even when one is available
    #[serde(default)]
    pub force_cpu: bool,

    /// Only use cached model files, never touch the network
    #[serde(default)]
    pub offline: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            repo: default_model_repo(),
            revision: default_model_revision(),
            endpoint: default_model_endpoint(),
            cache_dir: None,
            max_input_tokens: default_max_input_tokens(),
            force_cpu: false,
            offline: false,
        }
    }
}

impl ModelConfig {
    /// Directory holding cached model files
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("digestr").join("models")))
            .unwrap_or_else(|| PathBuf::from(".digestr").join("models"))
    }
}

/// Summarization pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SummarizerConfig {
    /// Maximum number of words per segment
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model_repo() -> String {
    "google-t5/t5-base".to_string()
}

fn default_model_revision() -> String {
    "main".to_string()
}

fn default_model_endpoint() -> String {
    "https://huggingface.co".to_string()
}

fn default_max_input_tokens() -> usize {
    512
}

fn default_max_words() -> usize {
    DEFAULT_MAX_WORDS
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let model = &self.model;

        if model.repo.trim().is_empty() {
            return Err(anyhow!("Model repository must not be empty"));
        }
        if model.repo.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(anyhow!("Invalid model repository: {}", model.repo));
        }
        if model.revision.trim().is_empty() {
            return Err(anyhow!("Model revision must not be empty"));
        }

        let endpoint = Url::parse(&model.endpoint)
            .with_context(|| format!("Invalid model endpoint: {}", model.endpoint))?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(anyhow!("Model endpoint must use http or https: {}", model.endpoint));
        }

        if model.max_input_tokens == 0 {
            return Err(anyhow!("max_input_tokens must be greater than zero"));
        }
        if self.summarizer.max_words == 0 {
            return Err(anyhow!("max_words must be greater than zero"));
        }

        Ok(())
    }

    /// Load the configuration at `path`, writing a default one if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            model: ModelConfig::default(),
            summarizer: SummarizerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
