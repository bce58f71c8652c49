//! PlotKit Settings Crate
//!
//! Handles plot configuration defaults, settings persistence, and validation.

pub mod config;
pub mod error;

pub use config::{FrameSettings, PlotSettings, SETTINGS_FILE_NAME};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
