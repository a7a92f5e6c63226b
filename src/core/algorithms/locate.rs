//! Point location by walking across edge neighbors.
//!
//! Starting from a hint triangle, the walk evaluates the query point against
//! the three edge half-spaces of the current triangle and steps across the
//! most-outward edge until the point is enclosed. Influenced by Guibas &
//! Stolfi's incremental work; expected O(√n) steps from a good hint.
//!
//! The per-triangle rotation of the edge-evaluation order
//! ([`Mesh::rotation_seed`]) breaks walk cycles in symmetric configurations.

use crate::core::mesh::{Mesh, TriangleKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::{dot2, normalize2};

/// Half-space epsilon for the walk's outwardness tests. The projections it
/// guards are of *normalized* vectors, so the constant is absolute.
pub(crate) const WALK_EPSILON: f64 = 1.0e-14;

/// Successful location of a query point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateHit {
    /// The point lies strictly inside this triangle.
    Interior(TriangleKey),
    /// The point lies on an edge of this triangle.
    OnEdge {
        /// The triangle the walk ended in.
        tri: TriangleKey,
        /// The neighbor across the crossed edge, if the edge is interior.
        neighbor: Option<TriangleKey>,
        /// Endpoints of the crossed edge.
        edge: [usize; 2],
    },
}

/// Why the walk gave up. Neither case is fatal to the triangulation;
/// the offending point is skipped and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateFailure {
    /// The query coincides with an existing vertex (within tolerance).
    DuplicatePoint,
    /// The walk bounced back or ran out of steps; the local geometry is too
    /// degenerate to resolve.
    Degeneracy,
}

/// Walk from `start` to the triangle containing `x`.
///
/// `tol` is the absolute duplicate-point threshold: if `x` is within `tol`
/// of any vertex of a visited triangle, the walk reports
/// [`LocateFailure::DuplicatePoint`].
///
/// # Errors
///
/// [`LocateFailure`] when the point duplicates an existing vertex or the
/// local geometry is degenerate.
pub fn find_triangle(
    mesh: &Mesh,
    points: &[Point],
    x: &Point,
    start: TriangleKey,
    tol: f64,
) -> Result<LocateHit, LocateFailure> {
    let max_steps = 10_000.max(4 * mesh.num_cells());
    let mut tri = start;
    let mut came_from: Option<TriangleKey> = None;

    for _ in 0..max_steps {
        let pts = mesh.cell_points(tri);
        let p = [&points[pts[0]], &points[pts[1]], &points[pts[2]]];

        let ir = Mesh::rotation_seed(tri);
        let mut min_proj = WALK_EPSILON;
        let mut crossed = [0usize; 2];
        let mut inside = true;

        for ic in 0..3 {
            let i = (ir + ic) % 3;
            let i2 = (i + 1) % 3;
            let i3 = (i + 2) % 3;

            // Outward 2D normal of edge (i, i2) defines a half-space; the
            // candidate and the opposite vertex are evaluated against it.
            let mut n = [-(p[i2].y() - p[i].y()), p[i2].x() - p[i].x()];
            normalize2(&mut n);

            let mut vp = [p[i3].x() - p[i].x(), p[i3].y() - p[i].y()];
            let mut vx = [x.x() - p[i].x(), x.y() - p[i].y()];
            normalize2(&mut vp);
            if normalize2(&mut vx) <= tol {
                return Err(LocateFailure::DuplicatePoint);
            }

            // Orient the normal away from the opposite vertex, then project
            // the candidate: positive means on the triangle side.
            let dp = dot2(n, vx) * if dot2(n, vp) < 0.0 { -1.0 } else { 1.0 };
            if dp < min_proj {
                inside = false;
                crossed = [pts[i], pts[i2]];
                min_proj = dp;
            }
        }

        if inside {
            return Ok(LocateHit::Interior(tri));
        }

        if min_proj.abs() < WALK_EPSILON {
            // On the crossed edge, not measurably beyond it.
            let nei = mesh.edge_neighbors(Some(tri), crossed[0], crossed[1]);
            return Ok(LocateHit::OnEdge {
                tri,
                neighbor: nei.first().copied(),
                edge: crossed,
            });
        }

        let nei = mesh.edge_neighbors(Some(tri), crossed[0], crossed[1]);
        match nei.first().copied() {
            Some(next) if Some(next) != came_from => {
                came_from = Some(tri);
                tri = next;
            }
            // Bounced straight back (or walked off the mesh): give up.
            _ => return Err(LocateFailure::Degeneracy),
        }
    }

    Err(LocateFailure::Degeneracy)
}
