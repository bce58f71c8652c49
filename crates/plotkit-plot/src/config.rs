//! Plot configuration model.

use plotkit_core::{DeviceWindow, Orientation, PlotRotation};
use plotkit_devicedb::{MediaSelection, PageSize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Scale policy of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    /// Fit the window to the page
    ScaleToFit,
    /// Real-world measurement, no auto-fit
    OneToOne,
}

/// Where the plot goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    Printer,
    Pdf,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Printer => write!(f, "printer"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

/// Media matching policy handed to the backend validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchingPolicy {
    Disabled,
    #[default]
    MatchEnabled,
}

/// Everything the backend needs to plot one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotConfiguration {
    pub window: DeviceWindow,
    pub orientation: Orientation,
    pub scale_mode: ScaleMode,
    pub centered: bool,
    pub device_name: String,
    pub media: MediaSelection,
    pub target_page: PageSize,
    pub style_sheet: String,
    pub output_kind: OutputKind,
    pub layout: String,
}

impl PlotConfiguration {
    /// Rotation sent to the backend.
    ///
    /// Portrait plots at 180°, landscape at 270°. A media that had to be
    /// turned to hold the page adds one more quarter turn.
    pub fn plot_rotation(&self) -> PlotRotation {
        let base = self.orientation.plot_rotation();
        if self.media.rotation_applied {
            base.turned_counter_clockwise()
        } else {
            base
        }
    }
}

/// A configuration the backend accepted.
///
/// Only the builder creates one, and a job consumes it by value, so a
/// configuration is validated exactly once and plotted at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPlot(PlotConfiguration);

impl ValidatedPlot {
    pub(crate) fn new(config: PlotConfiguration) -> Self {
        Self(config)
    }

    pub fn config(&self) -> &PlotConfiguration {
        &self.0
    }

    pub fn into_inner(self) -> PlotConfiguration {
        self.0
    }
}

/// Destination of a plot job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotOutput {
    pub kind: OutputKind,
    /// Printer queue or virtual device name
    pub device_name: String,
    /// Output base name
    pub name: String,
    /// Target file for file output
    pub file: Option<PathBuf>,
}

impl PlotOutput {
    pub fn printer(device_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: OutputKind::Printer,
            device_name: device_name.into(),
            name: name.into(),
            file: None,
        }
    }

    pub fn file(device_name: impl Into<String>, directory: PathBuf, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: OutputKind::Pdf,
            device_name: device_name.into(),
            file: Some(directory.join(&name)),
            name,
        }
    }
}

impl fmt::Display for PlotOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(path) => write!(f, "{} -> {}", self.device_name, path.display()),
            None => write!(f, "{} ({})", self.device_name, self.name),
        }
    }
}
