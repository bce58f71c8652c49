use plotkit_core::{classify, Error, Orientation, PlotRotation};
use plotkit_devicedb::{MatchKind, MediaCandidate};
use plotkit_plot::headless::SimEngine;
use plotkit_plot::{OutputKind, PlotConfigBuilder, ScaleMode};
use plotkit_settings::PlotSettings;
use proptest::prelude::*;

use crate::fixtures::{catalog, catalog_with, window, PDF, PDF_MEDIA, PRINTER};

#[test]
fn test_printer_plot_uses_default_device_and_letter() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let mut engine = SimEngine::new(catalog.clone());

    let plot = PlotConfigBuilder::new(&catalog, &settings, window(0.0, 0.0, 10.0, 5.0))
        .build(&mut engine)
        .unwrap();
    let config = plot.config();

    assert_eq!(config.device_name, PRINTER);
    assert_eq!(config.media.media_name, "Letter");
    assert_eq!(config.media.kind, MatchKind::CanonicalName);
    assert_eq!(config.orientation, Orientation::Landscape);
    assert_eq!(config.plot_rotation(), PlotRotation::Degrees270);
    assert_eq!(config.scale_mode, ScaleMode::ScaleToFit);
    assert!(config.centered);
    assert_eq!(config.style_sheet, "monochrome.ctb");
    assert_eq!(engine.validated().len(), 1);
}

#[test]
fn test_pdf_plot_uses_virtual_device() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let mut engine = SimEngine::new(catalog.clone());

    let plot = PlotConfigBuilder::new(&catalog, &settings, window(0.0, 0.0, 5.0, 10.0))
        .device(PRINTER)
        .output(OutputKind::Pdf)
        .build(&mut engine)
        .unwrap();

    assert_eq!(plot.config().device_name, PDF);
    assert_eq!(plot.config().media.media_name, PDF_MEDIA);
    assert_eq!(plot.config().orientation, Orientation::Portrait);
}

#[test]
fn test_orientation_override_wins() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let mut engine = SimEngine::new(catalog.clone());

    let plot = PlotConfigBuilder::new(&catalog, &settings, window(0.0, 0.0, 10.0, 5.0))
        .orientation(Orientation::Portrait)
        .scale_mode(ScaleMode::OneToOne)
        .build(&mut engine)
        .unwrap();
    assert_eq!(plot.config().orientation, Orientation::Portrait);
    assert_eq!(plot.config().scale_mode, ScaleMode::OneToOne);
}

#[test]
fn test_closest_media_turned_adds_quarter_turn() {
    let catalog = catalog_with(vec![
        MediaCandidate::new("Strip", 12.0, 9.0),
        MediaCandidate::new("Poster", 24.0, 36.0),
    ]);
    let settings = PlotSettings::default();
    let mut engine = SimEngine::new(catalog.clone());

    let plot = PlotConfigBuilder::new(&catalog, &settings, window(0.0, 0.0, 10.0, 5.0))
        .build(&mut engine)
        .unwrap();
    let config = plot.config();
    assert_eq!(config.media.media_name, "Strip");
    assert!(config.media.rotation_applied);
    assert_eq!(config.plot_rotation(), PlotRotation::Degrees000);
}

#[test]
fn test_no_suitable_media() {
    let catalog = catalog_with(vec![MediaCandidate::new("A5", 5.8, 8.3)]);
    let settings = PlotSettings::default();
    let mut engine = SimEngine::new(catalog.clone());

    let err = PlotConfigBuilder::new(&catalog, &settings, window(0.0, 0.0, 10.0, 5.0))
        .build(&mut engine)
        .unwrap_err();
    assert!(matches!(err, Error::NoMatch { .. }));
    assert!(err.is_configuration_error());
    assert!(engine.validated().is_empty());
}

#[test]
fn test_unsupported_style_sheet_fails_validation() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let mut engine = SimEngine::new(catalog.clone());

    let err = PlotConfigBuilder::new(&catalog, &settings, window(0.0, 0.0, 10.0, 5.0))
        .style_sheet("screening.ctb")
        .build(&mut engine)
        .unwrap_err();
    match err {
        Error::ValidationFailure { reason } => assert!(reason.contains("screening.ctb")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_device_is_rejected() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let mut engine = SimEngine::new(catalog.clone());

    let err = PlotConfigBuilder::new(&catalog, &settings, window(0.0, 0.0, 10.0, 5.0))
        .device("Basement Plotter")
        .build(&mut engine)
        .unwrap_err();
    assert!(err.is_configuration_error());
}

proptest! {
    #[test]
    fn built_orientation_follows_window_aspect(
        x0 in -500.0..500.0f64,
        y0 in -500.0..500.0f64,
        w in 0.1..300.0f64,
        h in 0.1..300.0f64,
    ) {
        let catalog = catalog();
        let settings = PlotSettings::default();
        let mut engine = SimEngine::new(catalog.clone());
        let win = window(x0, y0, x0 + w, y0 + h);

        let plot = PlotConfigBuilder::new(&catalog, &settings, win)
            .build(&mut engine)
            .unwrap();
        prop_assert_eq!(plot.config().orientation, classify(&win));
        prop_assert_eq!(
            plot.config().plot_rotation(),
            classify(&win).plot_rotation()
        );
    }
}
