use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use log::warn;

use crate::language_utils;
use crate::segmentation::{DetectorRegistry, SegmentationModel};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO 639), or `auto` to detect it per file
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (DeepL form, e.g. `TR`, `EN-US`)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Sentence segmentation config
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Job processing config
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepL REST API
    #[default]
    DeepL,
    // @provider: In-process mock, prefixes texts with the target code
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepL => "DeepL",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DeepL => "deepl".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    // @field: API key, never logged in clear
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL, empty for the DeepL free endpoint
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds per provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Sentences per provider call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Formality preference, only sent for targets that support it
    #[serde(default = "default_formality")]
    pub formality: String,

    /// Ask the provider to keep punctuation and casing
    #[serde(default = "default_true")]
    pub preserve_formatting: bool,

    /// Reuse translations of identical sentences within a process
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
            formality: default_formality(),
            preserve_formatting: true,
            cache_enabled: true,
        }
    }
}

impl TranslationConfig {
    /// API key with all but its ends hidden, for display
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Sentence segmentation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmentationConfig {
    /// Configured models, tried in order when selecting a detector
    #[serde(default = "DetectorRegistry::default_models")]
    pub models: Vec<SegmentationModel>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self { models: DetectorRegistry::default_models() }
    }
}

/// Job processing configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobsConfig {
    /// Where submitted caption files are stored
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Where translated caption files are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of jobs running at once
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Status polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Remove leftover files from the upload and output directories at startup
    #[serde(default)]
    pub cleanup_on_start: bool,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_dir: default_output_dir(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            poll_interval_ms: default_poll_interval_ms(),
            cleanup_on_start: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

const FORMALITY_VALUES: &[&str] = &["default", "more", "less", "prefer_more", "prefer_less"];

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "TR".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    crate::translation::DEFAULT_BATCH_SIZE
}

fn default_formality() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subresync")
}

fn default_upload_dir() -> PathBuf {
    data_dir().join("uploads")
}

fn default_output_dir() -> PathBuf {
    data_dir().join("outputs")
}

impl Config {
    /// Load the configuration file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_reader(BufReader::new(file))
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
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Whether the source language is detected per file
    pub fn auto_detect_source(&self) -> bool {
        self.source_language.trim().eq_ignore_ascii_case("auto")
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.auto_detect_source() {
            language_utils::get_language_name(&self.source_language)
                .with_context(|| format!("Invalid source language: {}", self.source_language))?;
        }

        if !language_utils::is_supported_target(&self.target_language) {
            return Err(anyhow!("Unsupported target language: {}", self.target_language));
        }

        let translation = &self.translation;
        if translation.provider == TranslationProvider::DeepL && translation.api_key.trim().is_empty() {
            return Err(anyhow!("Translation API key is required for DeepL provider"));
        }

        if !translation.endpoint.is_empty() {
            url::Url::parse(&translation.endpoint)
                .with_context(|| format!("Invalid endpoint URL: {}", translation.endpoint))?;
        }

        if translation.batch_size == 0 {
            return Err(anyhow!("translation.batch_size must be at least 1"));
        }
        if translation.timeout_secs == 0 {
            return Err(anyhow!("translation.timeout_secs must be at least 1"));
        }
        if !FORMALITY_VALUES.contains(&translation.formality.as_str()) {
            return Err(anyhow!(
                "Invalid formality '{}', expected one of: {}",
                translation.formality,
                FORMALITY_VALUES.join(", ")
            ));
        }

        if self.jobs.max_concurrent_jobs == 0 {
            return Err(anyhow!("jobs.max_concurrent_jobs must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            segmentation: SegmentationConfig::default(),
            jobs: JobsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
