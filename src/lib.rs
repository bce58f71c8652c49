//! # PlotKit
//!
//! Plot window resolution and media matching for CAD hosts:
//! - Pick two corners, or drag and rotate a fixed-size frame
//! - Convert the window from working space to device space
//! - Match the target page against the device's media list
//! - Validate the configuration and run it as a single-flight plot job
//!
//! ## Architecture
//!
//! PlotKit is organized as a workspace with multiple crates:
//!
//! 1. **plotkit-core** - Errors, geometry, window conversion, orientation
//! 2. **plotkit-devicedb** - Media model, device catalog, media matching
//! 3. **plotkit-settings** - Plot settings persistence and validation
//! 4. **plotkit-designer** - Host interfaces, window selection, frame jig
//! 5. **plotkit-plot** - Configuration builder, job runner, commands, headless host
//! 6. **plotkit** - Logging setup and the scenario runner binary

use std::path::Path;

pub use plotkit_core::{
    classify, convert_window, CoordinateSpace, DeviceWindow, Error, Extents3d, Orientation,
    PlotRotation, Point2D, RawPoint3D, Result, SpaceConverter,
};

pub use plotkit_devicedb::{
    DeviceCatalog, DeviceProfile, Margins, MediaCandidate, MediaMatcher, MediaSelection,
    PageSize, StaticCatalog,
};

pub use plotkit_settings::{FrameSettings, PlotSettings};

pub use plotkit_designer::{
    frame_window, DrawingDatabase, FrameEntity, FrameJig, FrameSession, FramedWindow,
    InputService, InterceptGuard, KeyFilter, TransactionScope, WindowSelector,
};

pub use plotkit_plot::headless;
pub use plotkit_plot::{
    commands, JobReport, JobStep, OutputKind, PlotConfigBuilder, PlotConfiguration, PlotEngine,
    PlotEvent, PlotEventDispatcher, PlotJobRunner, PlotSlot, ScaleMode, ValidatedPlot,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatting on stderr, so stdout stays free for reports
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Loads settings from `path`, or from the platform location when `None`.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<PlotSettings> {
    let settings = match path {
        Some(path) => PlotSettings::load_from_file(path)?,
        None => PlotSettings::load_or_default()?,
    };
    Ok(settings)
}

/// Replays a scenario file against the headless host using the process-wide
/// plot slot.
pub fn run_scenario(scenario: &Path, settings: &PlotSettings) -> anyhow::Result<JobReport> {
    let scenario = headless::Scenario::load(scenario)?;
    let events = PlotEventDispatcher::default();
    let runner = PlotJobRunner::for_process(events);
    let outcome = scenario.run(settings, &runner);
    tracing::info!(
        steps = outcome.steps.len(),
        committed = outcome.transactions.committed,
        aborted = outcome.transactions.aborted,
        "scenario finished"
    );
    Ok(outcome.result?)
}
