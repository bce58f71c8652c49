//! Single-flight plot job runner.
//!
//! Only one plot may run per process. The [`PlotSlot`] is taken with an
//! atomic check-and-set and handed back by a ticket that releases it on drop,
//! so the slot returns to idle after success, after a failed step and while
//! unwinding from a panic. A busy slot fails fast with `JobInProgress`.

use chrono::{DateTime, Utc};
use plotkit_core::{Error, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{PlotOutput, ValidatedPlot};
use crate::engine::{JobStep, PlotEngine, PlotJob, ProcessPlotState};
use crate::event::{PlotEvent, PlotEventDispatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlotJobState {
    Idle,
    Running,
}

/// The "a plot is running" flag.
#[derive(Debug, Default)]
pub struct PlotSlot {
    busy: AtomicBool,
}

static PROCESS_SLOT: OnceLock<Arc<PlotSlot>> = OnceLock::new();

impl PlotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot shared by every plot command in this process.
    pub fn process() -> Arc<PlotSlot> {
        Arc::clone(PROCESS_SLOT.get_or_init(|| Arc::new(PlotSlot::new())))
    }

    pub fn state(&self) -> PlotJobState {
        if self.busy.load(Ordering::Acquire) {
            PlotJobState::Running
        } else {
            PlotJobState::Idle
        }
    }

    /// Takes the slot if it is idle.
    pub fn try_acquire(&self) -> Option<SlotTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotTicket { slot: self })
    }
}

/// Proof of holding the slot. Releases it when dropped.
#[derive(Debug)]
pub struct SlotTicket<'a> {
    slot: &'a PlotSlot,
}

impl Drop for SlotTicket<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
        debug!("plot slot released");
    }
}

/// Summary of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub job_id: Uuid,
    pub output: PlotOutput,
    pub device_name: String,
    pub media_name: String,
    pub steps_completed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs validated plots one at a time.
#[derive(Clone)]
pub struct PlotJobRunner {
    slot: Arc<PlotSlot>,
    events: PlotEventDispatcher,
}

impl PlotJobRunner {
    pub fn new(slot: Arc<PlotSlot>, events: PlotEventDispatcher) -> Self {
        Self { slot, events }
    }

    /// Runner bound to the process-wide slot.
    pub fn for_process(events: PlotEventDispatcher) -> Self {
        Self::new(PlotSlot::process(), events)
    }

    pub fn slot(&self) -> &PlotSlot {
        &self.slot
    }

    pub fn events(&self) -> &PlotEventDispatcher {
        &self.events
    }

    /// Runs the full lifecycle of one job.
    ///
    /// Fails with `JobInProgress` when another job holds the slot or the
    /// backend reports it is already plotting. Stops at the first failing
    /// step and reports it as `Backend`.
    pub fn run(
        &self,
        engine: &mut dyn PlotEngine,
        plot: ValidatedPlot,
        output: PlotOutput,
    ) -> Result<JobReport> {
        let Some(_ticket) = self.slot.try_acquire() else {
            return Err(self.reject("another job holds the plot slot"));
        };
        if engine.state() != ProcessPlotState::NotPlotting {
            return Err(self.reject("the plot engine is busy"));
        }

        let config = plot.into_inner();
        let job_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(job = %job_id, device = %config.device_name, media = %config.media.media_name, output = %output, "plot job started");
        self.events.publish(PlotEvent::Started {
            job_id,
            device: config.device_name.clone(),
            media: config.media.media_name.clone(),
            at: started_at,
        });

        let job = PlotJob {
            id: job_id,
            config: &config,
            output: &output,
        };
        let total = JobStep::SEQUENCE.len();
        let generate_at = JobStep::SEQUENCE
            .iter()
            .position(|s| *s == JobStep::Generate)
            .unwrap_or(0);

        for (index, step) in JobStep::SEQUENCE.iter().copied().enumerate() {
            if let Err(reason) = engine.step(step, &job) {
                warn!(job = %job_id, %step, %reason, "plot job failed");
                self.events.publish(PlotEvent::Failed {
                    job_id,
                    step,
                    reason: reason.clone(),
                });
                return Err(Error::Backend {
                    step: step.name().to_string(),
                    reason,
                });
            }
            self.events.publish(PlotEvent::Progress {
                job_id,
                step,
                sheet_percent: if index >= generate_at { 100 } else { 0 },
                plot_percent: ((index + 1) * 100 / total) as u8,
            });
        }

        let finished_at = Utc::now();
        self.events.publish(PlotEvent::Finished {
            job_id,
            at: finished_at,
        });
        info!(job = %job_id, "plot job finished");

        Ok(JobReport {
            job_id,
            device_name: config.device_name.clone(),
            media_name: config.media.media_name.clone(),
            output,
            steps_completed: total,
            started_at,
            finished_at,
        })
    }

    fn reject(&self, reason: &str) -> Error {
        warn!(%reason, "plot rejected, a job is in progress");
        self.events.publish(PlotEvent::Rejected {
            reason: reason.to_string(),
        });
        Error::JobInProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_single_flight() {
        let slot = PlotSlot::new();
        let ticket = slot.try_acquire().unwrap();
        assert_eq!(slot.state(), PlotJobState::Running);
        assert!(slot.try_acquire().is_none());
        drop(ticket);
        assert_eq!(slot.state(), PlotJobState::Idle);
        assert!(slot.try_acquire().is_some());
    }

    #[test]
    fn test_process_slot_is_shared() {
        assert!(Arc::ptr_eq(&PlotSlot::process(), &PlotSlot::process()));
    }
}
