//! Plot configuration defaults.
//!
//! Settings are stored as JSON or TOML (chosen by file extension) in the
//! platform configuration directory and validated on every load and save.
//!
//! Sections:
//! - Target page and canonical media names
//! - Virtual PDF device
//! - Style sheet and output naming
//! - Frame template used by the true-scale command

use plotkit_devicedb::PageSize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Default settings file name inside the PlotKit config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Frame template settings for interactive framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    /// Block definition holding the frame outline
    pub block_name: String,
    /// Frame width at 0° rotation
    pub width: f64,
    /// Frame height at 0° rotation
    pub height: f64,
    /// Keyword that turns the frame a quarter
    pub rotate_keyword: String,
    /// Command string the key filter sends for the rotate key
    pub rotate_command: String,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            block_name: "PlotGuide".to_string(),
            width: 8.5,
            height: 11.0,
            rotate_keyword: "ROtate90".to_string(),
            rotate_command: "_RO".to_string(),
        }
    }
}

/// Complete plot configuration defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Canonical media tried first on printers
    pub printer_media_name: String,
    /// Virtual device used for PDF output
    pub pdf_device_name: String,
    /// Canonical media tried first on the PDF device
    pub pdf_media_name: String,
    /// Style sheet attached to every configuration
    pub style_sheet: String,
    /// Subtract media margins during the closest-media search
    pub match_printable_area: bool,
    /// Output base name for printer commands
    pub default_output_name: String,
    /// Tolerance for media size comparisons
    pub media_tolerance: f64,
    /// Output directory override; the drawing's directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
    /// Standard page every command targets
    pub target_page: PageSize,
    /// Frame template
    pub frame: FrameSettings,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            printer_media_name: "Letter".to_string(),
            pdf_device_name: "DWG to PDF.pc3".to_string(),
            pdf_media_name: "ANSI_expand_A_(8.50_x_11.00_Inches)".to_string(),
            style_sheet: "monochrome.ctb".to_string(),
            match_printable_area: true,
            default_output_name: "Nameless".to_string(),
            media_tolerance: 1e-6,
            output_directory: None,
            target_page: PageSize::LETTER,
            frame: FrameSettings::default(),
        }
    }
}

impl PlotSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform location of the settings file (`<config_dir>/plotkit/settings.toml`).
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join("plotkit").join(SETTINGS_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults when the file
    /// does not exist yet.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                )
                .into())
            }
        };

        settings.validate()?;
        info!(path = %path.display(), "loaded plot settings");
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML), creating the parent directory.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                )
                .into())
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.target_page.width) || !positive(self.target_page.height) {
            return Err(SettingsError::invalid(
                "target_page",
                "width and height must be > 0",
            ));
        }
        if !positive(self.frame.width) || !positive(self.frame.height) {
            return Err(SettingsError::invalid(
                "frame",
                "width and height must be > 0",
            ));
        }

        for (key, value) in [
            ("printer_media_name", &self.printer_media_name),
            ("pdf_device_name", &self.pdf_device_name),
            ("pdf_media_name", &self.pdf_media_name),
            ("style_sheet", &self.style_sheet),
            ("default_output_name", &self.default_output_name),
            ("frame.block_name", &self.frame.block_name),
            ("frame.rotate_keyword", &self.frame.rotate_keyword),
        ] {
            if value.trim().is_empty() {
                return Err(SettingsError::invalid(key, "must not be empty"));
            }
        }

        if !self.media_tolerance.is_finite() || self.media_tolerance < 0.0 {
            return Err(SettingsError::invalid(
                "media_tolerance",
                "must be >= 0",
            ));
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}
