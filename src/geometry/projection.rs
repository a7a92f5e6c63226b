//! Projection of 3D input points onto a triangulation plane.
//!
//! The triangulation works in the xy-plane. Inputs that live on some other
//! plane in 3-space are first mapped by a rigid [`PlaneTransform`]: either one
//! supplied by the caller, or one computed from the best-fitting plane of the
//! input cloud.

use nalgebra::{Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::point::{Bounds, Point};

/// Relative thickness below which the bounding box is considered flat along
/// one axis, short-circuiting the least-squares plane fit.
const FLAT_BOX_TOLERANCE: f64 = 1.0e-3;

/// How input points are mapped into the triangulation plane.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ProjectionPlane {
    /// Use the x and y coordinates as-is (z is ignored by in-plane tests).
    #[default]
    Xy,
    /// Compute the best-fitting plane of the input and project onto it.
    BestFitting,
    /// Apply an explicit plane transform supplied by the caller.
    Transform(PlaneTransform),
}

/// A rigid map taking points of an arbitrary plane into the xy-plane:
/// `p ↦ R · (p − origin)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaneTransform {
    rotation: Rotation3<f64>,
    origin: Vector3<f64>,
}

impl PlaneTransform {
    /// Build the transform for the plane through `origin` with the given
    /// normal. The rotation takes the normal onto the +z axis.
    #[must_use]
    pub fn from_plane(origin: [f64; 3], normal: [f64; 3]) -> Self {
        let n = Vector3::from(normal);
        let z = Vector3::z();
        let axis = n.cross(&z);
        let rotation = if axis.norm() == 0.0 {
            // Normal already (anti-)parallel to z.
            if n.dot(&z) < 0.0 {
                Rotation3::from_axis_angle(&Unit::new_unchecked(Vector3::x()), std::f64::consts::PI)
            } else {
                Rotation3::identity()
            }
        } else {
            let angle = (n.normalize().dot(&z)).clamp(-1.0, 1.0).acos();
            Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle)
        };
        Self {
            rotation,
            origin: Vector3::from(origin),
        }
    }

    /// Map one point.
    #[must_use]
    pub fn apply(&self, p: &Point) -> Point {
        let v = self.rotation * (Vector3::from(p.coords()) - self.origin);
        Point::new([v.x, v.y, v.z])
    }

    /// Map a whole point set.
    #[must_use]
    pub fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.apply(p)).collect()
    }
}

/// Compute the transform onto the best-fitting plane of `points`.
///
/// When the bounding box is thin along one axis the plane is taken
/// perpendicular to that axis. Otherwise the normal is the eigenvector of the
/// covariance matrix with the smallest eigenvalue; if that degenerates (all
/// points collinear or coincident) the xy-plane is used.
#[must_use]
pub fn best_fitting_plane(points: &[Point]) -> PlaneTransform {
    let Some(bounds) = Bounds::of(points) else {
        return PlaneTransform::from_plane([0.0; 3], [0.0, 0.0, 1.0]);
    };
    let length = bounds.diagonal();

    // Flat-box fast path.
    let mut dir = 0;
    let mut width = length;
    for axis in 0..3 {
        if bounds.extent(axis) < width {
            dir = axis;
            width = bounds.extent(axis);
        }
    }
    if width <= length * FLAT_BOX_TOLERANCE {
        let mut normal = [0.0; 3];
        normal[dir] = 1.0;
        return PlaneTransform::from_plane(bounds.center(), normal);
    }

    // Least-squares fit: normal is the smallest-eigenvalue direction of the
    // centered covariance matrix.
    let n = points.len() as f64;
    let mut centroid = Vector3::zeros();
    for p in points {
        centroid += Vector3::from(p.coords());
    }
    centroid /= n;

    let mut cov = nalgebra::Matrix3::<f64>::zeros();
    for p in points {
        let d = Vector3::from(p.coords()) - centroid;
        cov += d * d.transpose();
    }
    let eigen = nalgebra::SymmetricEigen::new(cov);
    let mut min_idx = 0;
    for i in 1..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[min_idx] {
            min_idx = i;
        }
    }
    let normal: Vector3<f64> = eigen.eigenvectors.column(min_idx).into_owned();
    if normal.norm() == 0.0 {
        return PlaneTransform::from_plane(centroid.into(), [0.0, 0.0, 1.0]);
    }
    PlaneTransform::from_plane(centroid.into(), normal.into())
}
