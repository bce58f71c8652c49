//! # PlotKit Core
//!
//! Core types shared by every PlotKit crate: the error taxonomy, working and
//! device space geometry, the window converter and the orientation classifier.

pub mod error;
pub mod geometry;
pub mod orientation;
pub mod types;

pub use error::{Error, Result};

pub use geometry::{
    convert_window, CoordinateSpace, DeviceWindow, Extents3d, IdentityConverter, Point2D,
    RawPoint3D, SpaceConverter,
};

pub use orientation::{classify, Orientation, PlotRotation};

pub use types::{thread_safe_vec, ThreadSafeVec};
