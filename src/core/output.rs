//! Output assembly: ring removal, orphan rescue, and final cell emission.
//!
//! The working mesh still contains the eight bounding-ring points and every
//! triangle that touches them. Unless the caller asked to keep the bounding
//! triangulation, those triangles are dropped, which can strand an input
//! point whose every incident triangle touched the ring. The rescue pass
//! swaps diagonals to reconnect such points before emission.

use thiserror::Error;
use tracing::debug;

use crate::core::mesh::{Mesh, TriClass, TriClasses};
use crate::core::triangulator::TriangulationDiagnostics;
use crate::geometry::point::Point;
use crate::geometry::predicates::{dot3, triangle_normal};

/// The one fatal failure of assembly: the mesh violated its manifold
/// contract where the rescue pass requires it.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// An interior edge with other than one far-side triangle.
    #[error("edge ({p1}, {p2}) is non-manifold")]
    NonManifoldEdge {
        /// Edge endpoint.
        p1: usize,
        /// Edge endpoint.
        p2: usize,
    },
}

/// Mark every triangle touching a bounding-ring point for removal.
pub fn drop_ring_triangles(mesh: &Mesh, num_input: usize, classes: &mut TriClasses) {
    for ring_pt in num_input..num_input + 8 {
        for &cell in mesh.point_cells(ring_pt) {
            classes.insert(cell, TriClass::Discard);
        }
    }
}

/// Reconnect input points whose every incident triangle is marked for
/// removal.
///
/// For each such point, each incident triangle's far edge (when both of its
/// endpoints are input points) forms a quadrilateral with the neighbor
/// across it; the diagonal is swapped whenever the two candidate triangles
/// agree in orientation, and survival flags are updated for the rewritten
/// pair.
///
/// # Errors
///
/// [`AssemblyError::NonManifoldEdge`] if an interior edge does not have
/// exactly one far-side triangle; the mesh is structurally broken.
pub fn rescue_orphans(
    mesh: &mut Mesh,
    working: &[Point],
    num_input: usize,
    classes: &mut TriClasses,
    diag: &mut TriangulationDiagnostics,
) -> Result<(), AssemblyError> {
    for pt_id in 0..num_input {
        let connected = mesh
            .point_cells(pt_id)
            .iter()
            .any(|&cell| classes[cell] == TriClass::Keep);
        if connected {
            continue;
        }

        // Snapshot: swaps below extend this point's incidence list.
        let cells: Vec<_> = mesh.point_cells(pt_id).to_vec();
        for tri1 in cells {
            let pts = mesh.cell_points(tri1);
            // Far edge of tri1 as seen from pt_id, in cyclic order.
            let (p1, p2) = if pts[0] == pt_id {
                (pts[1], pts[2])
            } else if pts[1] == pt_id {
                (pts[2], pts[0])
            } else {
                (pts[0], pts[1])
            };

            if p1 >= num_input && p2 >= num_input {
                continue; // both on the ring: swapping cannot help
            }

            let neighbors = mesh.edge_neighbors(Some(tri1), p1, p2);
            if neighbors.len() != 1 {
                return Err(AssemblyError::NonManifoldEdge { p1, p2 });
            }
            let tri2 = neighbors[0];
            let p3 = mesh.opposite_vertex(tri2, p1, p2);

            // The swapped pair must not fold over.
            let n1 = triangle_normal(&working[pt_id], &working[p1], &working[p3]);
            let n2 = triangle_normal(&working[pt_id], &working[p3], &working[p2]);
            if dot3(n1, n2) < 0.0 {
                continue;
            }

            // Swap edge (p1, p2) for diagonal (pt_id, p3).
            mesh.remove_reference(p1, tri2);
            mesh.remove_reference(p2, tri1);
            mesh.add_reference(pt_id, tri2);
            mesh.add_reference(p3, tri1);
            mesh.replace_cell(tri1, [pt_id, p1, p3]);
            mesh.replace_cell(tri2, [pt_id, p3, p2]);

            classes.insert(
                tri1,
                keep_if(p1 < num_input && p3 < num_input),
            );
            classes.insert(
                tri2,
                keep_if(p3 < num_input && p2 < num_input),
            );

            diag.orphan_swaps += 1;
            debug!(pt_id, p3, "orphan point reconnected by diagonal swap");
        }
    }
    Ok(())
}

fn keep_if(keep: bool) -> TriClass {
    if keep {
        TriClass::Keep
    } else {
        TriClass::Discard
    }
}

/// Emit the surviving triangles as index triples.
pub fn collect_triangles(mesh: &Mesh, classes: &TriClasses, keep_all: bool) -> Vec<[usize; 3]> {
    mesh.cells()
        .filter(|(key, _)| keep_all || classes[*key] == TriClass::Keep)
        .map(|(_, pts)| pts)
        .collect()
}
