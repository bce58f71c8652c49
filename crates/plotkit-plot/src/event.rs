//! Plot job progress events
//!
//! Provides:
//! - Event types for the job lifecycle
//! - A broadcast dispatcher progress surfaces subscribe to

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::engine::JobStep;

/// Plot job event types
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlotEvent {
    /// A job took the plot slot
    Started {
        job_id: Uuid,
        device: String,
        media: String,
        at: DateTime<Utc>,
    },
    /// A lifecycle step completed
    Progress {
        job_id: Uuid,
        step: JobStep,
        /// Progress of the current sheet, 0..=100
        sheet_percent: u8,
        /// Progress of the whole job, 0..=100
        plot_percent: u8,
    },
    /// All steps completed
    Finished { job_id: Uuid, at: DateTime<Utc> },
    /// A step failed and the remaining steps were skipped
    Failed {
        job_id: Uuid,
        step: JobStep,
        reason: String,
    },
    /// The slot was taken, nothing was started
    Rejected { reason: String },
}

impl std::fmt::Display for PlotEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotEvent::Started { job_id, device, media, .. } => {
                write!(f, "Job {} started on {} ({})", job_id, device, media)
            }
            PlotEvent::Progress {
                step, plot_percent, ..
            } => write!(f, "{}: {}%", step, plot_percent),
            PlotEvent::Finished { job_id, .. } => write!(f, "Job {} finished", job_id),
            PlotEvent::Failed { step, reason, .. } => write!(f, "{} failed: {}", step, reason),
            PlotEvent::Rejected { reason } => write!(f, "Rejected: {}", reason),
        }
    }
}

/// Event dispatcher for publishing plot events to subscribers
#[derive(Clone)]
pub struct PlotEventDispatcher {
    tx: broadcast::Sender<PlotEvent>,
}

impl PlotEventDispatcher {
    /// Create a new event dispatcher
    ///
    /// # Arguments
    /// * `buffer_size` - Size of the broadcast buffer
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PlotEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of receivers; zero when nobody listens.
    pub fn publish(&self, event: PlotEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for PlotEventDispatcher {
    fn default() -> Self {
        Self::new(64)
    }
}
