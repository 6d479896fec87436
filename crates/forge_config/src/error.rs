//! Error types for the config module.

use std::path::PathBuf;
use thiserror::Error;

use crate::validator::ValidationReport;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating a cluster document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported config format for {0} (expected .yml, .yaml, .json or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("Config validation failed:\n{0}")]
    Validation(ValidationReport),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
