//! Delaunay restoration by recursive edge flips.
//!
//! After a point is inserted, each edge of the modified triangles is suspect:
//! if the opposite vertex of the neighboring triangle falls inside the
//! circumcircle of (inserted point, edge), the shared diagonal is swapped and
//! the two newly exposed edges become suspect in turn. Recursion is bounded;
//! numerical degeneracies can otherwise make the cascade very deep.

use tracing::warn;

use crate::core::mesh::{Mesh, TriangleKey};
use crate::core::triangulator::TriangulationDiagnostics;
use crate::geometry::point::Point;
use crate::geometry::predicates::in_circle;

/// Flip-cascade depth bound. Hitting it leaves a locally non-Delaunay but
/// structurally valid mesh.
pub(crate) const MAX_RECURSION_DEPTH: u32 = 2500;

/// Check the edge (`p1`, `p2`) of `tri` against the Delaunay criterion for
/// the inserted point `pt_id` at `x`, swapping the diagonal if it fails.
///
/// With `recursive` set, the two edges exposed by a swap are re-checked,
/// cascading until every affected edge is Delaunay (or the depth bound is
/// hit). Returns whether any swap happened.
#[allow(clippy::too_many_arguments)]
pub fn check_edge(
    mesh: &mut Mesh,
    points: &[Point],
    bounding_radius2: f64,
    pt_id: usize,
    x: &Point,
    p1: usize,
    p2: usize,
    tri: TriangleKey,
    recursive: bool,
    depth: u32,
    diag: &mut TriangulationDiagnostics,
) -> bool {
    if depth >= MAX_RECURSION_DEPTH {
        warn!(depth, "edge flip recursion depth exceeded");
        diag.flip_depth_exhaustions += 1;
        return false;
    }

    let Some(&nei) = mesh.edge_neighbors(Some(tri), p1, p2).first() else {
        return false; // boundary edge
    };

    let p3 = mesh.opposite_vertex(nei, p1, p2);
    let x1 = &points[p1];
    let x2 = &points[p2];
    let x3 = &points[p3];

    if !in_circle(x3, x, x1, x2, bounding_radius2) {
        return false;
    }

    // Swap the diagonal: (p1, p2) becomes (pt_id, p3).
    mesh.remove_reference(p1, tri);
    mesh.remove_reference(p2, nei);
    mesh.add_reference(pt_id, nei);
    mesh.add_reference(p3, tri);
    mesh.replace_cell(tri, [pt_id, p3, p2]);
    mesh.replace_cell(nei, [pt_id, p1, p3]);

    if recursive {
        // Two new edges become suspect.
        check_edge(
            mesh,
            points,
            bounding_radius2,
            pt_id,
            x,
            p3,
            p2,
            tri,
            true,
            depth + 1,
            diag,
        );
        check_edge(
            mesh,
            points,
            bounding_radius2,
            pt_id,
            x,
            p1,
            p3,
            nei,
            true,
            depth + 1,
            diag,
        );
    }

    true
}
