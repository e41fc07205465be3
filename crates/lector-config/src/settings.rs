//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Filesystem paths
    #[serde(default)]
    pub paths: PathsConfig,

    /// Layout parsing constants
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Synthesis configuration
    #[serde(default)]
    pub tts: TtsConfig,

    /// Streaming configuration
    #[serde(default)]
    pub stream: StreamConfig,
}

impl Settings {
    /// Load from an optional config file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config = builder
            .add_source(Environment::with_prefix("LECTOR").separator("__"))
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.min_rate <= 0.0 || self.stream.min_rate > self.stream.max_rate {
            return Err(ConfigError::InvalidValue {
                field: "stream.min_rate".to_string(),
                message: format!(
                    "rate bounds must satisfy 0 < min <= max, got {}..{}",
                    self.stream.min_rate, self.stream.max_rate
                ),
            });
        }
        if !(0.0..=0.5).contains(&self.layout.header_footer_height_ratio) {
            return Err(ConfigError::InvalidValue {
                field: "layout.header_footer_height_ratio".to_string(),
                message: "band ratio must be within 0..=0.5".to_string(),
            });
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Filesystem paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Uploaded page-dump directory.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Speech cache directory.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { upload_dir: default_upload_dir(), cache_dir: default_cache_dir() }
    }
}

/// Layout parsing constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Column centers closer than this ratio of page width merge.
    #[serde(default = "default_column_min_spacing_ratio")]
    pub column_min_spacing_ratio: f32,

    /// Header/footer band height as a ratio of page height.
    #[serde(default = "default_header_footer_height_ratio")]
    pub header_footer_height_ratio: f32,

    /// Share of pages a band must populate for cross-page corroboration.
    /// Carried for the stated follow-up; the per-page band is the
    /// implemented heuristic.
    #[serde(default = "default_header_footer_min_pages_ratio")]
    pub header_footer_min_pages_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_min_spacing_ratio: default_column_min_spacing_ratio(),
            header_footer_height_ratio: default_header_footer_height_ratio(),
            header_footer_min_pages_ratio: default_header_footer_min_pages_ratio(),
        }
    }
}

/// Synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Default voice identifier.
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Total synthesis attempts per unit, first call included.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

/// Streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Lower bound for a session's synthesis rate.
    #[serde(default = "default_min_rate")]
    pub min_rate: f32,

    /// Upper bound for a session's synthesis rate.
    #[serde(default = "default_max_rate")]
    pub max_rate: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { min_rate: default_min_rate(), max_rate: default_max_rate() }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_cache_dir() -> String {
    "cache/audio".to_string()
}

fn default_column_min_spacing_ratio() -> f32 {
    0.15
}

fn default_header_footer_height_ratio() -> f32 {
    0.15
}

fn default_header_footer_min_pages_ratio() -> f32 {
    0.6
}

fn default_voice() -> String {
    "default".to_string()
}

fn default_max_retries() -> u32 {
    4
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_min_rate() -> f32 {
    0.8
}

fn default_max_rate() -> f32 {
    2.0
}
