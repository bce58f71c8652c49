//! Geometry and coordinate conversion.
//!
//! Points picked by the operator live in the drawing's working space. The plot
//! backend expects a window in device space, which is independent of the
//! working space's rotation and scale. The host owns the actual transform; this
//! module sorts the picked corners and pushes each one through it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};

/// A 2D coordinate in the drawing's working space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Lifts the point onto the z = 0 plane.
    pub fn to_3d(self) -> RawPoint3D {
        RawPoint3D::new(self.x, self.y, 0.0)
    }

    /// Rotates the point about the origin by `radians` (counter-clockwise).
    pub fn rotated(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// A raw 3D point as supplied by the host's input service.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPoint3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl RawPoint3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Drops the z component.
    pub fn to_2d(self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

impl From<Point2D> for RawPoint3D {
    fn from(p: Point2D) -> Self {
        p.to_3d()
    }
}

/// Axis-aligned bounding extents of an entity, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents3d {
    pub min: RawPoint3D,
    pub max: RawPoint3D,
}

impl Extents3d {
    pub fn new(min: RawPoint3D, max: RawPoint3D) -> Self {
        Self { min, max }
    }

    /// Builds the bounding extents of a set of planar points.
    ///
    /// Returns `None` for an empty set.
    pub fn bounding(points: &[Point2D]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(
            RawPoint3D::new(min_x, min_y, 0.0),
            RawPoint3D::new(max_x, max_y, 0.0),
        ))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Normalized rectangle in device (plot) space.
///
/// Always satisfies `min_x <= max_x` and `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviceWindow {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl DeviceWindow {
    /// Builds a window from two arbitrary opposite corners.
    pub fn from_corners(a: Point2D, b: Point2D) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn min_point(&self) -> Point2D {
        Point2D::new(self.min_x, self.min_y)
    }

    pub fn max_point(&self) -> Point2D {
        Point2D::new(self.max_x, self.max_y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the same window shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

impl fmt::Display for DeviceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, {}, {}, {}}}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Coordinate systems the host can translate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSpace {
    /// The drawing's fixed world system
    World,
    /// The working (user) system points are picked in
    Working,
    /// The display/device system the plot window is expressed in
    Device,
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World => write!(f, "world"),
            Self::Working => write!(f, "working"),
            Self::Device => write!(f, "device"),
        }
    }
}

/// The host's space conversion primitive.
pub trait SpaceConverter {
    /// Transforms `point` from one coordinate space into another.
    fn transform(
        &self,
        point: RawPoint3D,
        from: CoordinateSpace,
        to: CoordinateSpace,
    ) -> std::result::Result<RawPoint3D, String>;
}

/// Converts two picked working-space points into a device window.
///
/// The corners are sorted first, flattened to z = 0 and transformed one at a
/// time so rotated working spaces map correctly. The result is normalized
/// again after the transform.
pub fn convert_window(
    converter: &dyn SpaceConverter,
    a: RawPoint3D,
    b: RawPoint3D,
) -> Result<DeviceWindow> {
    let sorted = DeviceWindow::from_corners(a.to_2d(), b.to_2d());

    let first = converter
        .transform(
            sorted.min_point().to_3d(),
            CoordinateSpace::Working,
            CoordinateSpace::Device,
        )
        .map_err(Error::conversion)?;
    let second = converter
        .transform(
            sorted.max_point().to_3d(),
            CoordinateSpace::Working,
            CoordinateSpace::Device,
        )
        .map_err(Error::conversion)?;

    let window = DeviceWindow::from_corners(first.to_2d(), second.to_2d());
    debug!(%window, "converted plot window to device space");
    Ok(window)
}

/// A converter that leaves points untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl SpaceConverter for IdentityConverter {
    fn transform(
        &self,
        point: RawPoint3D,
        _from: CoordinateSpace,
        _to: CoordinateSpace,
    ) -> std::result::Result<RawPoint3D, String> {
        Ok(point)
    }
}
