//! # PlotKit Plot
//!
//! Turns a device window into a validated plot configuration and runs it as
//! a single-flight job.
//!
//! ## Modules
//!
//! - `config`: configuration model and output targets
//! - `builder`: device and media resolution, backend validation
//! - `engine`: execution backend interface and job lifecycle steps
//! - `job`: process-wide plot slot and job runner
//! - `event`: progress events
//! - `commands`: the three operator commands
//! - `headless`: in-memory host used by tests and the scenario runner

pub mod builder;
pub mod commands;
pub mod config;
pub mod engine;
pub mod event;
pub mod headless;
pub mod job;

pub use builder::{PlotConfigBuilder, MODEL_LAYOUT};
pub use commands::{
    plot_true_scale_framed, plot_window_pdf, plot_window_scaled, CommandContext,
    FILE_NAME_PROMPT,
};
pub use config::{
    MatchingPolicy, OutputKind, PlotConfiguration, PlotOutput, ScaleMode, ValidatedPlot,
};
pub use engine::{JobStep, PlotEngine, PlotJob, ProcessPlotState};
pub use event::{PlotEvent, PlotEventDispatcher};
pub use job::{JobReport, PlotJobRunner, PlotJobState, PlotSlot, SlotTicket};
