use plotkit_core::{Error, Orientation, Point2D};
use plotkit_designer::{Key, KeyEvent};
use plotkit_plot::headless::{
    isolated_runner, AffineTransform, DrawingSetup, InputStep, SimDrawing, SimEngine, SimInput,
};
use plotkit_plot::{
    plot_true_scale_framed, plot_window_pdf, plot_window_scaled, CommandContext, JobStep,
    OutputKind, PlotJobState, ScaleMode, FILE_NAME_PROMPT,
};
use plotkit_devicedb::MediaCandidate;
use plotkit_settings::PlotSettings;
use std::path::PathBuf;

use crate::fixtures::{catalog, catalog_with, PDF, PDF_MEDIA, PRINTER};

fn point(x: f64, y: f64) -> InputStep {
    InputStep::Point { x, y }
}

struct Host {
    drawing: SimDrawing,
    input: SimInput,
    engine: SimEngine,
}

impl Host {
    fn new(setup: DrawingSetup, script: Vec<InputStep>) -> Self {
        Self {
            drawing: SimDrawing::new(setup),
            input: SimInput::new(script),
            engine: SimEngine::new(catalog()),
        }
    }
}

#[test]
fn test_window_plot_end_to_end() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let mut host = Host::new(DrawingSetup::default(), vec![point(0.0, 0.0), point(10.0, 5.0)]);

    let report = plot_window_scaled(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap();

    let config = &host.engine.validated()[0];
    assert_eq!(config.window.to_string(), "{0, 0, 10, 5}");
    assert_eq!(config.orientation, Orientation::Landscape);
    assert_eq!(config.scale_mode, ScaleMode::ScaleToFit);
    assert!(config.centered);
    assert_eq!(config.media.media_name, "Letter");

    assert_eq!(report.device_name, PRINTER);
    assert_eq!(report.output.name, "Nameless");
    assert_eq!(report.output.kind, OutputKind::Printer);
    assert_eq!(host.engine.steps(), JobStep::SEQUENCE.to_vec());
    assert_eq!(host.engine.outputs().len(), 1);
    assert_eq!(runner.slot().state(), PlotJobState::Idle);

    assert_eq!(
        host.input.prompts(),
        &[
            "\nSelect First corner of plot area: ".to_string(),
            "\nSelect second corner of the plot area.".to_string(),
        ]
    );
    assert_eq!(host.drawing.transactions().committed, 1);
    assert_eq!(host.drawing.transactions().aborted, 0);
}

#[test]
fn test_window_is_converted_through_the_view() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let setup = DrawingSetup {
        transform: AffineTransform {
            scale: 2.0,
            rotation: 90.0,
            offset: Point2D::new(100.0, 0.0),
        },
        ..Default::default()
    };
    let mut host = Host::new(setup, vec![point(10.0, 5.0), point(0.0, 0.0)]);

    plot_window_scaled(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap();

    let config = &host.engine.validated()[0];
    // A 10 x 5 window turned a quarter and doubled is 10 wide, 20 tall.
    assert!((config.window.width() - 10.0).abs() < 1e-9);
    assert!((config.window.height() - 20.0).abs() < 1e-9);
    assert_eq!(config.orientation, Orientation::Portrait);
}

#[test]
fn test_cancelled_pick_has_no_side_effects() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let mut host = Host::new(DrawingSetup::default(), vec![point(0.0, 0.0), InputStep::Cancel]);

    let err = plot_window_scaled(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap_err();

    assert!(err.is_cancelled());
    assert!(host.input.messages().is_empty());
    assert!(host.engine.validated().is_empty());
    assert!(host.engine.steps().is_empty());
    assert_eq!(host.drawing.transactions().aborted, 1);
    assert_eq!(host.drawing.transactions().committed, 0);
}

#[test]
fn test_framed_plot_rotates_with_tab() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let mut host = Host::new(
        DrawingSetup::default(),
        vec![
            point(20.0, 30.0),
            InputStep::Key {
                event: KeyEvent::down(Key::Tab),
            },
            point(20.0, 30.0),
            InputStep::Confirm,
        ],
    );

    plot_true_scale_framed(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap();

    let config = &host.engine.validated()[0];
    assert_eq!(config.orientation, Orientation::Landscape);
    assert_eq!(config.scale_mode, ScaleMode::OneToOne);
    assert!((config.window.min_x() - 14.5).abs() < 1e-9);
    assert!((config.window.max_x() - 25.5).abs() < 1e-9);
    assert!((config.window.min_y() - 25.75).abs() < 1e-9);
    assert!((config.window.max_y() - 34.25).abs() < 1e-9);

    assert!(host.drawing.has_block("PlotGuide"));
    assert_eq!(host.input.active_filters(), 0);
    assert_eq!(
        host.input.prompts()[0],
        "\nSurround plot area: \nTab to rotate window [ROtate90]:"
    );
    assert_eq!(host.engine.steps().len(), JobStep::SEQUENCE.len());
}

#[test]
fn test_ctrl_tab_does_not_rotate_frame() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let mut host = Host::new(
        DrawingSetup::default(),
        vec![
            InputStep::Key {
                event: KeyEvent::down(Key::Tab).with_ctrl(),
            },
            InputStep::Confirm,
        ],
    );

    plot_true_scale_framed(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap();

    assert_eq!(host.engine.validated()[0].orientation, Orientation::Portrait);
}

#[test]
fn test_cancelled_frame_starts_nothing() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let mut host = Host::new(
        DrawingSetup::default(),
        vec![point(3.0, 3.0), InputStep::Cancel],
    );

    let err = plot_true_scale_framed(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!host.drawing.has_block("PlotGuide"));
    assert_eq!(host.drawing.reference_count(), 0);
    assert_eq!(host.input.active_filters(), 0);
    assert!(host.engine.validated().is_empty());
    assert!(host.engine.steps().is_empty());
}

#[test]
fn test_pdf_plot_writes_next_to_drawing() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let setup = DrawingSetup {
        path: PathBuf::from("/projects/site.dwg"),
        ..Default::default()
    };
    let mut host = Host::new(
        setup,
        vec![
            point(0.0, 0.0),
            point(10.0, 5.0),
            InputStep::Text {
                value: "site plan".to_string(),
            },
        ],
    );

    let report = plot_window_pdf(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap();

    assert_eq!(report.device_name, PDF);
    assert_eq!(report.media_name, PDF_MEDIA);
    assert_eq!(report.output.kind, OutputKind::Pdf);
    assert_eq!(report.output.file, Some(PathBuf::from("/projects/site plan")));
    assert_eq!(host.input.prompts().last().map(String::as_str), Some(FILE_NAME_PROMPT));
}

#[test]
fn test_pdf_name_prompt_cancelled() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let mut host = Host::new(
        DrawingSetup::default(),
        vec![point(0.0, 0.0), point(10.0, 5.0), InputStep::Cancel],
    );

    let err = plot_window_pdf(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap_err();

    assert!(err.is_cancelled());
    assert!(host.engine.steps().is_empty());
    assert_eq!(runner.slot().state(), PlotJobState::Idle);
}

#[test]
fn test_busy_slot_is_reported_to_operator() {
    let catalog = catalog();
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let mut host = Host::new(DrawingSetup::default(), vec![point(0.0, 0.0), point(10.0, 5.0)]);

    let _held = runner.slot().try_acquire().unwrap();
    let err = plot_window_scaled(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap_err();

    assert!(matches!(err, Error::JobInProgress));
    assert_eq!(host.input.messages().len(), 1);
    assert!(host.input.messages()[0].contains("Another plot is in progress"));
    assert!(host.engine.steps().is_empty());
}

#[test]
fn test_missing_page_size_is_reported_to_operator() {
    let catalog = catalog_with(vec![MediaCandidate::new("A5", 5.8, 8.3)]);
    let settings = PlotSettings::default();
    let runner = isolated_runner();
    let mut host = Host::new(DrawingSetup::default(), vec![point(0.0, 0.0), point(10.0, 5.0)]);

    let err = plot_window_scaled(&mut CommandContext {
        db: &mut host.drawing,
        input: &mut host.input,
        catalog: &catalog,
        engine: &mut host.engine,
        settings: &settings,
        runner: &runner,
    })
    .unwrap_err();

    assert!(matches!(err, Error::NoMatch { .. }));
    assert_eq!(
        host.input.messages(),
        &["\nNo suitable page size for 8.5 x 11".to_string()]
    );
    assert_eq!(host.drawing.transactions().aborted, 1);
}
