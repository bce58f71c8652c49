//! Error handling for PlotKit
//!
//! Every plot command fails locally and synchronously. The variants below are
//! the complete taxonomy a command can surface:
//! - Operator cancellations (prompt, corner pick, drag, file name)
//! - Coordinate conversion failures reported by the host
//! - Media matching and configuration validation failures
//! - Single-flight job rejections and lifecycle step failures
//!
//! None of them are retried automatically.

use thiserror::Error;

/// Main error type for PlotKit
#[derive(Error, Debug)]
pub enum Error {
    /// A prompt, corner pick or drag returned Cancel
    #[error("Cancelled by user")]
    UserCancelled,

    /// The host's space conversion primitive reported an error
    #[error("Coordinate conversion failed: {reason}")]
    ConversionFailure {
        /// The reason reported by the host.
        reason: String,
    },

    /// No media of the device can hold the target page, even turned 90°
    #[error("No suitable page size for {width} x {height}")]
    NoMatch {
        /// Target page width.
        width: f64,
        /// Target page height.
        height: f64,
    },

    /// The backend rejected the assembled plot configuration
    #[error("Plot configuration rejected: {reason}")]
    ValidationFailure {
        /// Validator message, surfaced verbatim.
        reason: String,
    },

    /// A plot job is already running in this process
    #[error("Another plot is in progress, try again when it has finished")]
    JobInProgress,

    /// The frame entity could not be moved or rotated
    #[error("Failed to apply frame position: {reason}")]
    ApplyFailure {
        /// The reason reported by the host.
        reason: String,
    },

    /// A job lifecycle step failed inside the plot engine
    #[error("Plot step {step} failed: {reason}")]
    Backend {
        /// Name of the failing step.
        step: String,
        /// The reason reported by the engine.
        reason: String,
    },

    /// A drawing database call failed
    #[error("Drawing database error: {reason}")]
    Host {
        /// The reason reported by the host.
        reason: String,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create a conversion failure
    pub fn conversion(reason: impl Into<String>) -> Self {
        Error::ConversionFailure {
            reason: reason.into(),
        }
    }

    /// Create a drawing database failure
    pub fn host(reason: impl Into<String>) -> Self {
        Error::Host {
            reason: reason.into(),
        }
    }

    /// Check if the operator cancelled the command
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::UserCancelled)
    }

    /// Check if the command may succeed when issued again later
    pub fn is_retryable_later(&self) -> bool {
        matches!(self, Error::JobInProgress)
    }

    /// Check if this is a media or configuration problem
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::NoMatch { .. } | Error::ValidationFailure { .. }
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
