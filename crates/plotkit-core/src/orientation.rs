//! Page orientation and plot rotation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::geometry::DeviceWindow;

/// Page orientation derived from a window's aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Plot rotation the backend uses for this orientation.
    pub fn plot_rotation(self) -> PlotRotation {
        match self {
            Self::Portrait => PlotRotation::Degrees180,
            Self::Landscape => PlotRotation::Degrees270,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => write!(f, "Portrait"),
            Self::Landscape => write!(f, "Landscape"),
        }
    }
}

/// Classifies a window as landscape when it is strictly wider than tall.
///
/// Ties are portrait.
pub fn classify(window: &DeviceWindow) -> Orientation {
    let width = (window.max_x() - window.min_x()).abs();
    let height = (window.max_y() - window.min_y()).abs();
    let orientation = if width > height {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };
    debug!(width, height, %orientation, "classified plot window");
    orientation
}

/// Rotation in quarter turns, as used both by the plot backend and the frame
/// jig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlotRotation {
    #[default]
    Degrees000,
    Degrees090,
    Degrees180,
    Degrees270,
}

impl PlotRotation {
    /// Angle in degrees, always in `[0, 360)`.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Degrees000 => 0,
            Self::Degrees090 => 90,
            Self::Degrees180 => 180,
            Self::Degrees270 => 270,
        }
    }

    pub fn radians(self) -> f64 {
        f64::from(self.degrees()).to_radians()
    }

    /// Normalizes any multiple of 90 degrees. Other angles are rejected.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Degrees000),
            90 => Some(Self::Degrees090),
            180 => Some(Self::Degrees180),
            270 => Some(Self::Degrees270),
            _ => None,
        }
    }

    /// One quarter turn clockwise: subtract 90 degrees and wrap into `[0, 360)`.
    pub fn turned_clockwise(self) -> Self {
        match self {
            Self::Degrees000 => Self::Degrees270,
            Self::Degrees090 => Self::Degrees000,
            Self::Degrees180 => Self::Degrees090,
            Self::Degrees270 => Self::Degrees180,
        }
    }

    /// One quarter turn counter-clockwise.
    pub fn turned_counter_clockwise(self) -> Self {
        match self {
            Self::Degrees000 => Self::Degrees090,
            Self::Degrees090 => Self::Degrees180,
            Self::Degrees180 => Self::Degrees270,
            Self::Degrees270 => Self::Degrees000,
        }
    }

    /// True for 90 and 270 degrees.
    pub fn is_quarter(self) -> bool {
        matches!(self, Self::Degrees090 | Self::Degrees270)
    }
}

impl fmt::Display for PlotRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;

    fn window(w: f64, h: f64) -> DeviceWindow {
        DeviceWindow::from_corners(Point2D::new(0.0, 0.0), Point2D::new(w, h))
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&window(10.0, 5.0)), Orientation::Landscape);
        assert_eq!(classify(&window(5.0, 10.0)), Orientation::Portrait);
        assert_eq!(classify(&window(7.0, 7.0)), Orientation::Portrait);
    }

    #[test]
    fn test_plot_rotation_mapping() {
        assert_eq!(
            Orientation::Portrait.plot_rotation(),
            PlotRotation::Degrees180
        );
        assert_eq!(
            Orientation::Landscape.plot_rotation(),
            PlotRotation::Degrees270
        );
    }

    #[test]
    fn test_four_clockwise_turns_return_to_start() {
        let mut r = PlotRotation::Degrees000;
        let mut seen = Vec::new();
        for _ in 0..4 {
            r = r.turned_clockwise();
            seen.push(r.degrees());
        }
        assert_eq!(seen, vec![270, 180, 90, 0]);
        assert_eq!(r, PlotRotation::Degrees000);
    }

    #[test]
    fn test_from_degrees_normalizes() {
        assert_eq!(PlotRotation::from_degrees(-90), Some(PlotRotation::Degrees270));
        assert_eq!(PlotRotation::from_degrees(450), Some(PlotRotation::Degrees090));
        assert_eq!(PlotRotation::from_degrees(45), None);
    }
}
