//! Three-coordinate points for planar triangulation.
//!
//! Every point carries three `f64` coordinates. The triangulation itself is
//! planar: the in-plane predicates read only `x` and `y`, while `z` is kept so
//! that inputs projected from 3-space (and the alpha test, which runs in the
//! original coordinate space) stay exact.

use serde::{Deserialize, Serialize};

/// A point with three `f64` coordinates.
///
/// # Examples
///
/// ```
/// use delaunay2d::geometry::point::Point;
///
/// let p = Point::new([1.0, 2.0, 0.0]);
/// assert_eq!(p.x(), 1.0);
/// assert_eq!(p.y(), 2.0);
/// assert_eq!(p.z(), 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coords: [f64; 3],
}

impl Point {
    /// Create a point from its three coordinates.
    #[must_use]
    pub const fn new(coords: [f64; 3]) -> Self {
        Self { coords }
    }

    /// Create a point in the z = 0 plane.
    #[must_use]
    pub const fn xy(x: f64, y: f64) -> Self {
        Self::new([x, y, 0.0])
    }

    /// The full coordinate triple.
    #[must_use]
    pub const fn coords(&self) -> [f64; 3] {
        self.coords
    }

    /// The x coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.coords[0]
    }

    /// The y coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.coords[1]
    }

    /// The z coordinate.
    #[must_use]
    pub const fn z(&self) -> f64 {
        self.coords[2]
    }

    /// The same point with z forced to zero (the working plane).
    #[must_use]
    pub const fn flattened(&self) -> Self {
        Self::new([self.coords[0], self.coords[1], 0.0])
    }

    /// Squared Euclidean distance to `other`, all three coordinates.
    #[must_use]
    pub fn distance2(&self, other: &Self) -> f64 {
        let dx = self.coords[0] - other.coords[0];
        let dy = self.coords[1] - other.coords[1];
        let dz = self.coords[2] - other.coords[2];
        dx * dx + dy * dy + dz * dz
    }
}

impl From<[f64; 3]> for Point {
    fn from(coords: [f64; 3]) -> Self {
        Self::new(coords)
    }
}

impl From<Point> for [f64; 3] {
    fn from(point: Point) -> Self {
        point.coords
    }
}

/// Axis-aligned bounds of a point set, with the derived quantities the
/// triangulation needs (center and diagonal length).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: [f64; 3],
    /// Maximum corner.
    pub max: [f64; 3],
}

impl Bounds {
    /// Compute the bounds of a non-empty point slice.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut min = first.coords();
        let mut max = min;
        for p in &points[1..] {
            let c = p.coords();
            for axis in 0..3 {
                min[axis] = min[axis].min(c[axis]);
                max[axis] = max[axis].max(c[axis]);
            }
        }
        Some(Self { min, max })
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        let dx = self.max[0] - self.min[0];
        let dy = self.max[1] - self.min[1];
        let dz = self.max[2] - self.min[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Extent along one axis.
    #[must_use]
    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }
}
