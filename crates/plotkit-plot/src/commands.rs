//! Operator commands.
//!
//! Each command is one blocking interactive sequence:
//! - `plot_window_scaled`: pick two corners, fit to the page, plot
//! - `plot_true_scale_framed`: drag and rotate the frame, plot one-to-one
//! - `plot_window_pdf`: pick two corners, fit to the page, plot to a PDF file
//!
//! A cancelled prompt or drag aborts the whole command before any
//! configuration is built or job started. Any other failure is echoed on the
//! operator's command line before it is returned.

use plotkit_core::{convert_window, DeviceWindow, Error, Orientation, Result};
use plotkit_designer::{frame_window, DrawingDatabase, InputService, TransactionScope, WindowSelector};
use plotkit_devicedb::DeviceCatalog;
use plotkit_settings::PlotSettings;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::builder::PlotConfigBuilder;
use crate::config::{OutputKind, PlotOutput, ScaleMode};
use crate::engine::PlotEngine;
use crate::job::{JobReport, PlotJobRunner};

/// Prompt shown before writing a PDF.
pub const FILE_NAME_PROMPT: &str = "Enter file Name: ";

/// Collaborators of one command invocation.
pub struct CommandContext<'a> {
    pub db: &'a mut dyn DrawingDatabase,
    pub input: &'a mut dyn InputService,
    pub catalog: &'a dyn DeviceCatalog,
    pub engine: &'a mut dyn PlotEngine,
    pub settings: &'a PlotSettings,
    pub runner: &'a PlotJobRunner,
}

/// Plot a picked window, scaled to fit, on the default printer.
pub fn plot_window_scaled(ctx: &mut CommandContext<'_>) -> Result<JobReport> {
    let result = window_scaled(ctx);
    report_failure(&mut *ctx.input, result)
}

fn window_scaled(ctx: &mut CommandContext<'_>) -> Result<JobReport> {
    info!("plot window, scale to fit");
    let tx = TransactionScope::begin(&mut *ctx.db);
    let window = WindowSelector::new().pick(&mut *ctx.input, tx.converter())?;
    let report = PrinterPlot {
        catalog: ctx.catalog,
        settings: ctx.settings,
        engine: &mut *ctx.engine,
        runner: ctx.runner,
    }
    .run(window, tx.current_layout(), None, ScaleMode::ScaleToFit)?;
    tx.commit()?;
    Ok(report)
}

/// Plot the window under a dragged frame at true scale on the default
/// printer.
pub fn plot_true_scale_framed(ctx: &mut CommandContext<'_>) -> Result<JobReport> {
    let result = true_scale_framed(ctx);
    report_failure(&mut *ctx.input, result)
}

fn true_scale_framed(ctx: &mut CommandContext<'_>) -> Result<JobReport> {
    info!("plot framed window, true scale");
    let framed = frame_window(&mut *ctx.db, &mut *ctx.input, &ctx.settings.frame)?;

    let tx = TransactionScope::begin(&mut *ctx.db);
    let window = convert_window(tx.converter(), framed.extents.min, framed.extents.max)?;
    let report = PrinterPlot {
        catalog: ctx.catalog,
        settings: ctx.settings,
        engine: &mut *ctx.engine,
        runner: ctx.runner,
    }
    .run(
        window,
        tx.current_layout(),
        Some(framed.orientation),
        ScaleMode::OneToOne,
    )?;
    tx.commit()?;
    Ok(report)
}

/// Plot a picked window, scaled to fit, to a PDF file next to the drawing.
pub fn plot_window_pdf(ctx: &mut CommandContext<'_>) -> Result<JobReport> {
    let result = window_pdf(ctx);
    report_failure(&mut *ctx.input, result)
}

fn window_pdf(ctx: &mut CommandContext<'_>) -> Result<JobReport> {
    info!("plot window to pdf");
    let tx = TransactionScope::begin(&mut *ctx.db);
    let window = WindowSelector::new().pick(&mut *ctx.input, tx.converter())?;

    let plot = PlotConfigBuilder::new(ctx.catalog, ctx.settings, window)
        .scale_mode(ScaleMode::ScaleToFit)
        .output(OutputKind::Pdf)
        .layout(tx.current_layout())
        .build(&mut *ctx.engine)?;

    let entered = ctx.input.get_string(FILE_NAME_PROMPT, true).into_value()?;
    let name = match entered.trim() {
        "" => ctx.settings.default_output_name.clone(),
        name => name.to_string(),
    };
    let directory = output_directory(ctx.settings, &tx.document_path())?;
    let output = PlotOutput::file(plot.config().device_name.clone(), directory, name);
    debug!(%output, "pdf output resolved");

    let report = ctx.runner.run(&mut *ctx.engine, plot, output)?;
    tx.commit()?;
    Ok(report)
}

struct PrinterPlot<'c> {
    catalog: &'c dyn DeviceCatalog,
    settings: &'c PlotSettings,
    engine: &'c mut dyn PlotEngine,
    runner: &'c PlotJobRunner,
}

impl PrinterPlot<'_> {
    fn run(
        self,
        window: DeviceWindow,
        layout: String,
        orientation: Option<Orientation>,
        scale_mode: ScaleMode,
    ) -> Result<JobReport> {
        let mut builder = PlotConfigBuilder::new(self.catalog, self.settings, window)
            .scale_mode(scale_mode)
            .output(OutputKind::Printer)
            .layout(layout);
        if let Some(orientation) = orientation {
            builder = builder.orientation(orientation);
        }
        let plot = builder.build(&mut *self.engine)?;

        let output = PlotOutput::printer(
            plot.config().device_name.clone(),
            self.settings.default_output_name.clone(),
        );
        self.runner.run(self.engine, plot, output)
    }
}

/// Echoes a failed command on the command line. Cancellation stays silent.
fn report_failure(input: &mut dyn InputService, result: Result<JobReport>) -> Result<JobReport> {
    if let Err(err) = &result {
        if !err.is_cancelled() {
            warn!(error = %err, "plot command failed");
            input.write_message(&format!("\n{err}"));
        }
    }
    result
}

fn output_directory(settings: &PlotSettings, document: &std::path::Path) -> Result<PathBuf> {
    if let Some(dir) = &settings.output_directory {
        return Ok(dir.clone());
    }
    document
        .parent()
        .map(PathBuf::from)
        .ok_or_else(|| Error::host(format!("{} has no parent directory", document.display())))
}
