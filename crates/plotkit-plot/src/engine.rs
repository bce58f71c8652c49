//! Plot execution backend interface.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::{MatchingPolicy, PlotConfiguration, PlotOutput};

/// Busy/idle signal of the backend itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessPlotState {
    #[default]
    NotPlotting,
    ForegroundPlotting,
    BackgroundPlotting,
}

/// Lifecycle calls of a single-document, single-sheet job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStep {
    BeginPlot,
    BeginDocument,
    BeginSheet,
    BeginPage,
    Generate,
    EndPage,
    EndSheet,
    EndDocument,
    EndPlot,
}

impl JobStep {
    /// Every step, in the order a job issues them.
    pub const SEQUENCE: [JobStep; 9] = [
        JobStep::BeginPlot,
        JobStep::BeginDocument,
        JobStep::BeginSheet,
        JobStep::BeginPage,
        JobStep::Generate,
        JobStep::EndPage,
        JobStep::EndSheet,
        JobStep::EndDocument,
        JobStep::EndPlot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BeginPlot => "begin-plot",
            Self::BeginDocument => "begin-document",
            Self::BeginSheet => "begin-sheet",
            Self::BeginPage => "begin-page",
            Self::Generate => "generate",
            Self::EndPage => "end-page",
            Self::EndSheet => "end-sheet",
            Self::EndDocument => "end-document",
            Self::EndPlot => "end-plot",
        }
    }
}

impl fmt::Display for JobStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a lifecycle step sees of the running job.
#[derive(Debug, Clone, Copy)]
pub struct PlotJob<'a> {
    pub id: Uuid,
    pub config: &'a PlotConfiguration,
    pub output: &'a PlotOutput,
}

/// The host's plot execution backend.
pub trait PlotEngine {
    fn state(&self) -> ProcessPlotState;

    /// Checks a configuration the way the backend's own validator does.
    fn validate(
        &mut self,
        config: &PlotConfiguration,
        policy: MatchingPolicy,
    ) -> std::result::Result<(), String>;

    /// Issues one lifecycle call.
    fn step(&mut self, step: JobStep, job: &PlotJob<'_>) -> std::result::Result<(), String>;
}
