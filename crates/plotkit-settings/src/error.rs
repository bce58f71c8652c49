//! Error types for the settings crate.
//!
//! This module provides structured error types for configuration management,
//! settings persistence, and validation.

use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// A configuration validation error occurred.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl SettingsError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors related to configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Platform is not supported for config directory resolution.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::invalid("style_sheet", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid setting 'style_sheet': must not be empty"
        );

        let err = SettingsError::ConfigDirectory("permission denied".to_string());
        assert_eq!(err.to_string(), "Config directory error: permission denied");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");

        let err = ConfigError::UnsupportedPlatform("wasm".to_string());
        assert_eq!(err.to_string(), "Unsupported platform: wasm");
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::UnsupportedFormat("ini".to_string());
        let settings_err: SettingsError = config_err.into();
        assert!(matches!(settings_err, SettingsError::Config(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::IoError(_)));
    }
}
