//! Plot configuration assembly.

use plotkit_core::{classify, DeviceWindow, Error, Orientation, Result};
use plotkit_devicedb::{CatalogError, DeviceCatalog, MediaMatcher};
use plotkit_settings::PlotSettings;
use tracing::{debug, info, warn};

use crate::config::{
    MatchingPolicy, OutputKind, PlotConfiguration, ScaleMode, ValidatedPlot,
};
use crate::engine::PlotEngine;

/// Layout name of model space.
pub const MODEL_LAYOUT: &str = "Model";

/// Assembles and validates a [`PlotConfiguration`] for one window.
pub struct PlotConfigBuilder<'a> {
    catalog: &'a dyn DeviceCatalog,
    settings: &'a PlotSettings,
    window: DeviceWindow,
    orientation: Option<Orientation>,
    scale_mode: ScaleMode,
    device_name: Option<String>,
    output_kind: OutputKind,
    style_sheet: Option<String>,
    layout: String,
}

impl<'a> PlotConfigBuilder<'a> {
    pub fn new(
        catalog: &'a dyn DeviceCatalog,
        settings: &'a PlotSettings,
        window: DeviceWindow,
    ) -> Self {
        Self {
            catalog,
            settings,
            window,
            orientation: None,
            scale_mode: ScaleMode::ScaleToFit,
            device_name: None,
            output_kind: OutputKind::Printer,
            style_sheet: None,
            layout: MODEL_LAYOUT.to_string(),
        }
    }

    /// Uses this orientation instead of classifying the window.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn scale_mode(mut self, scale_mode: ScaleMode) -> Self {
        self.scale_mode = scale_mode;
        self
    }

    /// Printer to use instead of the system default. Ignored for PDF output.
    pub fn device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn output(mut self, kind: OutputKind) -> Self {
        self.output_kind = kind;
        self
    }

    pub fn style_sheet(mut self, name: impl Into<String>) -> Self {
        self.style_sheet = Some(name.into());
        self
    }

    pub fn layout(mut self, name: impl Into<String>) -> Self {
        self.layout = name.into();
        self
    }

    /// Resolves device and media, then runs the backend validator.
    pub fn build(self, engine: &mut dyn PlotEngine) -> Result<ValidatedPlot> {
        let settings = self.settings;

        let (device_name, canonical_media) = match self.output_kind {
            OutputKind::Pdf => (
                settings.pdf_device_name.clone(),
                &settings.pdf_media_name,
            ),
            OutputKind::Printer => {
                let device = self
                    .device_name
                    .or_else(|| self.catalog.default_device())
                    .ok_or_else(|| catalog_error(CatalogError::NoDefaultDevice))?;
                (device, &settings.printer_media_name)
            }
        };

        let candidates = self.catalog.candidates(&device_name).map_err(catalog_error)?;
        let target = settings.target_page;
        let media = MediaMatcher::new()
            .with_canonical_name(canonical_media.clone())
            .with_tolerance(settings.media_tolerance)
            .match_media(&candidates, target, settings.match_printable_area)
            .ok_or(Error::NoMatch {
                width: target.width,
                height: target.height,
            })?;

        let orientation = match self.orientation {
            Some(o) => {
                debug!(orientation = %o, "using caller orientation");
                o
            }
            None => classify(&self.window),
        };

        if self.layout != MODEL_LAYOUT {
            info!(layout = %self.layout, "plotting from a paper space layout");
        }

        let config = PlotConfiguration {
            window: self.window,
            orientation,
            scale_mode: self.scale_mode,
            centered: true,
            device_name,
            media,
            target_page: target,
            style_sheet: self
                .style_sheet
                .unwrap_or_else(|| settings.style_sheet.clone()),
            output_kind: self.output_kind,
            layout: self.layout,
        };

        engine
            .validate(&config, MatchingPolicy::MatchEnabled)
            .map_err(|reason| {
                warn!(device = %config.device_name, %reason, "plot configuration rejected");
                Error::ValidationFailure { reason }
            })?;

        info!(
            device = %config.device_name,
            media = %config.media.media_name,
            orientation = %config.orientation,
            rotation = %config.plot_rotation(),
            "plot configuration validated"
        );
        Ok(ValidatedPlot::new(config))
    }
}

fn catalog_error(err: CatalogError) -> Error {
    Error::ValidationFailure {
        reason: err.to_string(),
    }
}
