//! Error types for the device catalog crate.
//!
//! This module provides structured error types for device lookup, catalog
//! persistence, and media validation.

use std::io;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The requested device is not in the catalog.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The device does not offer the requested media.
    #[error("Media '{media}' not offered by {device}")]
    MediaNotFound { device: String, media: String },

    /// No default device is configured.
    #[error("No default plot device configured")]
    NoDefaultDevice,

    /// A device with this name already exists.
    #[error("Device already exists: {0}")]
    DeviceAlreadyExists(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A media entry failed validation.
    #[error("Invalid media: {0}")]
    Media(#[from] MediaError),
}

/// Errors related to media entry validation.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The media name is empty.
    #[error("Media name must not be empty")]
    EmptyName,

    /// A page dimension is zero, negative or not finite.
    #[error("Invalid page size for {name}: {width} x {height}")]
    InvalidSize { name: String, width: f64, height: f64 },

    /// A margin is negative or eats the whole page.
    #[error("Invalid margins for {name}: {reason}")]
    InvalidMargins { name: String, reason: String },
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for media validation.
pub type MediaResult<T> = Result<T, MediaError>;
