//! Configuration
//!
//! Settings are loaded from an optional `lector.toml` plus `LECTOR__`
//! environment overrides (`LECTOR__SERVER__PORT=9000`), with serde defaults
//! per field so a bare process starts with sensible values.

mod settings;

pub use settings::{
    LayoutConfig, PathsConfig, ServerConfig, Settings, StreamConfig, TtsConfig,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
