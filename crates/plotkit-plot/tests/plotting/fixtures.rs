use plotkit_core::{DeviceWindow, Point2D};
use plotkit_devicedb::{DeviceProfile, Margins, MediaCandidate, StaticCatalog};
use plotkit_plot::headless::SimEngine;
use plotkit_plot::{PlotConfigBuilder, ValidatedPlot};
use plotkit_settings::PlotSettings;

pub const PRINTER: &str = "Office Laser";
pub const PDF: &str = "DWG to PDF.pc3";
pub const PDF_MEDIA: &str = "ANSI_expand_A_(8.50_x_11.00_Inches)";

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_device(
            DeviceProfile::new(PRINTER)
                .with_media(
                    MediaCandidate::new("Legal", 8.5, 14.0).with_margins(Margins::uniform(0.25)),
                )
                .with_media(
                    MediaCandidate::new("Letter", 8.5, 11.0).with_margins(Margins::uniform(0.25)),
                )
                .with_style_sheet("monochrome.ctb"),
        )
        .and_then(|c| {
            c.with_device(
                DeviceProfile::new(PDF)
                    .with_media(MediaCandidate::new("ANSI_expand_B_(11.00_x_17.00_Inches)", 11.0, 17.0))
                    .with_media(MediaCandidate::new(PDF_MEDIA, 8.5, 11.0)),
            )
        })
        .unwrap()
}

/// Catalog whose only printer lacks the canonical media.
pub fn catalog_with(media: Vec<MediaCandidate>) -> StaticCatalog {
    let mut profile = DeviceProfile::new("Plotter");
    for m in media {
        profile = profile.with_media(m);
    }
    StaticCatalog::new().with_device(profile).unwrap()
}

pub fn window(x0: f64, y0: f64, x1: f64, y1: f64) -> DeviceWindow {
    DeviceWindow::from_corners(Point2D::new(x0, y0), Point2D::new(x1, y1))
}

pub fn validated(engine: &mut SimEngine, catalog: &StaticCatalog) -> ValidatedPlot {
    let settings = PlotSettings::default();
    PlotConfigBuilder::new(catalog, &settings, window(0.0, 0.0, 10.0, 5.0))
        .build(engine)
        .unwrap()
}
