//! The incremental insertion loop.
//!
//! Every input point is located in the current mesh and spliced in: an
//! interior hit splits one triangle into three, an edge hit splits the two
//! incident triangles into four. Each new edge is then flip-checked
//! recursively to restore the Delaunay property.
//!
//! Points may be visited in natural order or through a GCD permutation
//! (`ptId = (P·idx + B) mod N`), which scrambles spatial locality enough to
//! avoid pathological walk costs on structured inputs while staying fully
//! deterministic. See
//! <https://lemire.me/blog/2017/09/18/visiting-all-values-in-an-array-exactly-once-in-random-order>.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::core::algorithms::flips::check_edge;
use crate::core::algorithms::locate::{find_triangle, LocateFailure, LocateHit};
use crate::core::mesh::{Mesh, TriangleKey};
use crate::core::triangulator::TriangulationDiagnostics;
use crate::geometry::point::Point;

/// How often (in points) progress is reported and the abort flag polled.
const POLL_INTERVAL: usize = 1000;

/// Deterministic pseudo-random traversal of `0..npts` via a coprime stride.
#[derive(Debug, Clone, Copy)]
pub struct GcdTraversal {
    npts: usize,
    prime: usize,
    offset: usize,
}

impl GcdTraversal {
    /// Pick the smallest stride `≥ npts/2 + 1` coprime with `npts`.
    /// A coprime always exists in `[npts/2, npts)`, so the search terminates.
    #[must_use]
    pub fn new(npts: usize) -> Self {
        let offset = npts / 2;
        let mut prime = offset + 1;
        while gcd(prime, npts) != 1 {
            prime += 1;
        }
        Self {
            npts,
            prime,
            offset,
        }
    }

    /// The point visited at position `idx` of the traversal.
    #[must_use]
    pub fn point_id(&self, idx: usize) -> usize {
        (self.prime.wrapping_mul(idx) + self.offset) % self.npts
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// External control handles for a triangulation run: an optional abort flag
/// polled every [`POLL_INTERVAL`] points, and an optional progress sink fed
/// the fraction of points processed.
#[derive(Default)]
pub struct RunControl<'a> {
    /// Cooperative cancellation flag.
    pub abort: Option<&'a AtomicBool>,
    /// One-way progress callback.
    pub progress: Option<&'a mut (dyn FnMut(f64) + 'static)>,
}

impl std::fmt::Debug for RunControl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunControl")
            .field("abort", &self.abort.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Insert all input points into the seeded mesh.
///
/// `points` holds the working coordinates including the bounding-ring points;
/// only indices `0..num_input` are inserted. Duplicate and degenerate points
/// are skipped and counted in `diag`. Returns early (leaving a structurally
/// valid partial mesh) if the abort flag is raised.
#[allow(clippy::too_many_arguments)]
pub fn insert_points(
    mesh: &mut Mesh,
    points: &[Point],
    num_input: usize,
    tol: f64,
    bounding_radius2: f64,
    random_order: bool,
    diag: &mut TriangulationDiagnostics,
    control: &mut RunControl<'_>,
) {
    let traversal = GcdTraversal::new(num_input);
    let mut last = mesh.first_cell().expect("seeded mesh has cells");
    let reset = last;

    for idx in 0..num_input {
        let pt_id = if random_order {
            traversal.point_id(idx)
        } else {
            idx
        };
        let x = points[pt_id];

        match find_triangle(mesh, points, &x, last, tol) {
            Ok(LocateHit::Interior(tri)) => {
                last = tri;
                split_triangle(mesh, points, bounding_radius2, pt_id, &x, tri, diag);
            }
            Ok(LocateHit::OnEdge {
                tri,
                neighbor: Some(nei),
                edge,
            }) => {
                last = tri;
                split_edge(
                    mesh,
                    points,
                    bounding_radius2,
                    pt_id,
                    &x,
                    tri,
                    nei,
                    edge,
                    diag,
                );
            }
            Ok(LocateHit::OnEdge { neighbor: None, .. }) => {
                // On a hull edge of the bounding triangulation; cannot split.
                diag.degeneracies += 1;
                last = reset;
            }
            Err(LocateFailure::DuplicatePoint) => {
                diag.duplicate_points += 1;
                last = reset;
            }
            Err(LocateFailure::Degeneracy) => {
                diag.degeneracies += 1;
                last = reset;
            }
        }

        if idx % POLL_INTERVAL == 0 {
            debug!(point = pt_id, "inserting");
            if let Some(progress) = control.progress.as_deref_mut() {
                progress(idx as f64 / num_input as f64);
            }
            if control
                .abort
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
            {
                diag.aborted = true;
                return;
            }
        }
    }
}

/// Interior hit: replace `tri` with one of three fans around the new point
/// and flip-check the three old boundary edges.
fn split_triangle(
    mesh: &mut Mesh,
    points: &[Point],
    bounding_radius2: f64,
    pt_id: usize,
    x: &Point,
    tri: TriangleKey,
    diag: &mut TriangulationDiagnostics,
) {
    let pts = mesh.cell_points(tri);

    mesh.remove_reference(pts[2], tri);
    mesh.replace_cell(tri, [pt_id, pts[0], pts[1]]);
    mesh.add_reference(pt_id, tri);

    let t1 = mesh.insert_linked_cell([pt_id, pts[1], pts[2]]);
    let t2 = mesh.insert_linked_cell([pt_id, pts[2], pts[0]]);

    check_edge(
        mesh,
        points,
        bounding_radius2,
        pt_id,
        x,
        pts[0],
        pts[1],
        tri,
        true,
        1,
        diag,
    );
    check_edge(
        mesh,
        points,
        bounding_radius2,
        pt_id,
        x,
        pts[1],
        pts[2],
        t1,
        true,
        1,
        diag,
    );
    check_edge(
        mesh,
        points,
        bounding_radius2,
        pt_id,
        x,
        pts[2],
        pts[0],
        t2,
        true,
        1,
        diag,
    );
}

/// Edge hit: rebuild the two triangles sharing the edge into four fanning
/// around the new point and flip-check all four outer edges.
#[allow(clippy::too_many_arguments)]
fn split_edge(
    mesh: &mut Mesh,
    points: &[Point],
    bounding_radius2: f64,
    pt_id: usize,
    x: &Point,
    tri: TriangleKey,
    nei: TriangleKey,
    edge: [usize; 2],
    diag: &mut TriangulationDiagnostics,
) {
    // Opposite vertices of the two triangles on the split edge.
    let p1 = mesh.opposite_vertex(nei, edge[0], edge[1]);
    let p2 = mesh.opposite_vertex(tri, edge[0], edge[1]);

    mesh.remove_reference(edge[1], tri);
    mesh.remove_reference(edge[1], nei);
    mesh.replace_cell(tri, [pt_id, p2, edge[0]]);
    mesh.replace_cell(nei, [pt_id, p1, edge[0]]);
    mesh.add_reference(pt_id, tri);
    mesh.add_reference(pt_id, nei);

    let t2 = mesh.insert_linked_cell([pt_id, p2, edge[1]]);
    let t3 = mesh.insert_linked_cell([pt_id, p1, edge[1]]);

    let suspects = [
        (p2, edge[0], tri),
        (p1, edge[0], nei),
        (p2, edge[1], t2),
        (p1, edge[1], t3),
    ];
    for (a, b, t) in suspects {
        check_edge(
            mesh,
            points,
            bounding_radius2,
            pt_id,
            x,
            a,
            b,
            t,
            true,
            1,
            diag,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_traversal_is_a_permutation() {
        for npts in [1usize, 2, 5, 8, 100, 101] {
            let traversal = GcdTraversal::new(npts);
            let mut seen = vec![false; npts];
            for idx in 0..npts {
                let id = traversal.point_id(idx);
                assert!(!seen[id], "id {id} visited twice for npts={npts}");
                seen[id] = true;
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn gcd_traversal_starts_past_the_midpoint() {
        let traversal = GcdTraversal::new(10);
        assert_eq!(traversal.point_id(0), 5);
    }

    #[test]
    fn interior_split_creates_three_triangles() {
        let points = vec![
            Point::xy(0.0, 0.0),
            Point::xy(4.0, 0.0),
            Point::xy(0.0, 4.0),
            Point::xy(1.0, 1.0),
        ];
        let mut mesh = Mesh::with_capacity(points.len(), 4);
        let tri = mesh.insert_linked_cell([0, 1, 2]);
        let mut diag = TriangulationDiagnostics::default();

        split_triangle(&mut mesh, &points, 1.0e12, 3, &points[3], tri, &mut diag);

        assert_eq!(mesh.num_cells(), 3);
        assert_eq!(mesh.point_cells(3).len(), 3);
        assert!(mesh.links_consistent());
        for (_, pts) in mesh.cells() {
            assert!(pts.contains(&3));
        }
    }

    #[test]
    fn edge_split_creates_four_triangles() {
        let points = vec![
            Point::xy(0.0, 0.0),
            Point::xy(2.0, 0.0),
            Point::xy(1.0, 2.0),
            Point::xy(1.0, -2.0),
            Point::xy(1.0, 0.0), // lies on edge (0, 1)
        ];
        let mut mesh = Mesh::with_capacity(points.len(), 6);
        let t0 = mesh.insert_linked_cell([0, 1, 2]);
        let t1 = mesh.insert_linked_cell([0, 3, 1]);
        let mut diag = TriangulationDiagnostics::default();

        split_edge(
            &mut mesh,
            &points,
            1.0e12,
            4,
            &points[4],
            t0,
            t1,
            [0, 1],
            &mut diag,
        );

        assert_eq!(mesh.num_cells(), 4);
        assert_eq!(mesh.point_cells(4).len(), 4);
        assert!(mesh.links_consistent());
        assert!(!mesh.is_edge(0, 1));
    }
}
