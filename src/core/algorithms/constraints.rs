//! Constraint edge recovery.
//!
//! A constraint edge that the Delaunay triangulation did not produce is
//! carved in after the fact: walk the corridor of triangles the edge crosses,
//! collect the corridor boundary as two vertex chains (one per side),
//! retriangulate each chain as a bounded polygon, and swap the new triangles
//! in place of the old ones. The corridor has as many triangles as the two
//! chain triangulations combined, so the replacement is one-for-one.
//!
//! Every stage before the swap is read-only; a failure at any stage leaves
//! the mesh untouched and only costs a warning.

use thiserror::Error;
use tracing::warn;

use crate::core::algorithms::flips::check_edge;
use crate::core::collections::FastHashSet;
use crate::core::mesh::{Mesh, TriangleKey};
use crate::core::triangulator::{ConstraintSource, TriangulationDiagnostics};
use crate::geometry::point::Point;
use crate::geometry::polygon::{bounded_triangulate, PolygonError};
use crate::geometry::predicates::{edge_plane_normal, plane_eval};

/// Why recovering one constraint edge failed. The mesh is unchanged in
/// every case.
#[derive(Debug, Error)]
pub enum RecoverEdgeError {
    /// The edge endpoints coincide in the working plane.
    #[error("constraint endpoints {p1} and {p2} coincide in the plane")]
    CoincidentEndpoints {
        /// First endpoint.
        p1: usize,
        /// Second endpoint.
        p2: usize,
    },

    /// No triangle at the first endpoint opens toward the second.
    #[error("no triangle at point {p1} separates it from point {p2}")]
    NoSeparatingTriangle {
        /// First endpoint.
        p1: usize,
        /// Second endpoint.
        p2: usize,
    },

    /// A corridor edge without exactly one far-side triangle.
    #[error("non-manifold edge ({a}, {b}) while walking the corridor")]
    NonManifoldEdge {
        /// Edge endpoint.
        a: usize,
        /// Edge endpoint.
        b: usize,
    },

    /// A degenerate (zero-length) separating edge in the corridor.
    #[error("degenerate separating edge at point {p}")]
    DegenerateEdge {
        /// The vertex where the walk degenerated.
        p: usize,
    },

    /// One of the two boundary chains refused to triangulate.
    #[error("influence polygon triangulation failed: {0}")]
    PolygonTriangulation(#[from] PolygonError),

    /// Chain triangulations and corridor disagree; a mesh-consistency bug.
    #[error("replacement produced {actual} triangles for a corridor of {expected}")]
    TriangleCountMismatch {
        /// Corridor triangle count.
        expected: usize,
        /// Combined chain triangle count.
        actual: usize,
    },
}

/// Recover every constraint edge (polyline segments and polygon boundaries)
/// that is missing from the mesh. Failures are warned about and counted, not
/// propagated.
pub fn recover_boundary(
    mesh: &mut Mesh,
    points: &[Point],
    num_input: usize,
    constraints: &ConstraintSource,
    bounding_radius2: f64,
    tolerance: f64,
    diag: &mut TriangulationDiagnostics,
) {
    let recover = |mesh: &mut Mesh, p1: usize, p2: usize, diag: &mut TriangulationDiagnostics| {
        if p1 >= num_input || p2 >= num_input {
            warn!(p1, p2, "constraint edge references an out-of-range point");
            diag.unrecovered_edges += 1;
            return;
        }
        if mesh.is_edge(p1, p2) {
            return;
        }
        if let Err(err) = recover_edge(
            mesh,
            points,
            constraints,
            bounding_radius2,
            tolerance,
            p1,
            p2,
            diag,
        ) {
            warn!(p1, p2, %err, "constraint edge not recovered");
            diag.unrecovered_edges += 1;
        }
    };

    for line in constraints.polylines() {
        for pair in line.windows(2) {
            recover(mesh, pair[0], pair[1], diag);
        }
    }
    for poly in constraints.polygons() {
        for i in 0..poly.len() {
            recover(mesh, poly[i], poly[(i + 1) % poly.len()], diag);
        }
    }
}

/// Carve one constraint edge (`p1`, `p2`) into the mesh.
///
/// # Errors
///
/// [`RecoverEdgeError`] when the corridor cannot be traversed or its chains
/// cannot be retriangulated; the mesh is left unchanged.
#[allow(clippy::too_many_arguments)]
pub fn recover_edge(
    mesh: &mut Mesh,
    points: &[Point],
    constraints: &ConstraintSource,
    bounding_radius2: f64,
    tolerance: f64,
    p1: usize,
    p2: usize,
    diag: &mut TriangulationDiagnostics,
) -> Result<(), RecoverEdgeError> {
    let p1x = points[p1].flattened();
    let p2x = points[p2].flattened();

    // Vertical split plane containing the constraint edge.
    let split_normal = edge_plane_normal(&p1x, &p2x)
        .ok_or(RecoverEdgeError::CoincidentEndpoints { p1, p2 })?;

    let corridor = walk_corridor(mesh, points, p1, p2, &p1x, &p2x, split_normal)?;

    // Both chains run from p1 to p2; with the constraint edge closing them
    // they bound the two halves of the influence polygon. Triangulate each
    // half independently (read-only; the swap happens only if both succeed).
    let left_tris = triangulate_chain(points, &corridor.left_chain, tolerance)?;
    let right_tris = triangulate_chain(points, &corridor.right_chain, tolerance)?;

    let actual = left_tris.len() + right_tris.len();
    if actual != corridor.tris.len() {
        return Err(RecoverEdgeError::TriangleCountMismatch {
            expected: corridor.tris.len(),
            actual,
        });
    }

    // Edges of the influence-polygon boundary are off-limits for the cleanup
    // flips below; collect them (the closing constraint edge included).
    let mut boundary_edges: FastHashSet<(usize, usize)> = FastHashSet::default();
    for chain in [&corridor.left_chain, &corridor.right_chain] {
        for i in 0..chain.len() {
            boundary_edges.insert(edge_key(chain[i], chain[(i + 1) % chain.len()]));
        }
    }

    // Swap the corridor triangles for the new ones, in place.
    let mut suspects: Vec<(TriangleKey, [usize; 3])> = Vec::new();
    for (slot, new_pts) in corridor
        .tris
        .iter()
        .zip(left_tris.iter().chain(right_tris.iter()))
    {
        mesh.remove_cell_references(*slot);
        mesh.replace_linked_cell(*slot, *new_pts);

        // Any new edge that is neither corridor boundary nor constrained is
        // suspect; triangles touching a constraint edge are left alone.
        let pts = *new_pts;
        let constrained = (0..3).any(|e| constraints.is_edge(pts[e], pts[(e + 1) % 3]));
        if constrained {
            continue;
        }
        for e in 0..3 {
            let (ep1, ep2) = (pts[e], pts[(e + 1) % 3]);
            if !boundary_edges.contains(&edge_key(ep1, ep2)) {
                let ep3 = pts[(e + 2) % 3];
                suspects.push((*slot, [ep1, ep2, ep3]));
            }
        }
    }

    // One non-recursive flip pass over the suspect edges. A successful flip
    // invalidates the remaining recorded keys and vertices, so stop there.
    for (cell, [ep1, ep2, ep3]) in suspects {
        let x3 = points[ep3];
        if check_edge(
            mesh,
            points,
            bounding_radius2,
            ep3,
            &x3,
            ep1,
            ep2,
            cell,
            false,
            1,
            diag,
        ) {
            break;
        }
    }

    Ok(())
}

/// The triangles crossed by a constraint edge and the two boundary chains of
/// the region they cover, both running from `p1` to `p2`.
struct Corridor {
    tris: Vec<TriangleKey>,
    left_chain: Vec<usize>,
    right_chain: Vec<usize>,
}

/// Find the corridor of triangles the segment (`p1`, `p2`) crosses.
///
/// Read-only. Starts from a triangle at `p1` whose far edge separates the
/// endpoints, then repeatedly steps across the far edge, assigning each new
/// opposite vertex to the left or right chain by its side of the split plane.
fn walk_corridor(
    mesh: &Mesh,
    points: &[Point],
    p1: usize,
    p2: usize,
    p1x: &Point,
    p2x: &Point,
    split_normal: [f64; 3],
) -> Result<Corridor, RecoverEdgeError> {
    // A triangle at p1 whose other two vertices straddle the split plane and
    // whose connecting edge separates p1 from p2.
    let mut found: Option<(TriangleKey, usize, usize, bool)> = None;
    for &cell in mesh.point_cells(p1) {
        let pts = mesh.cell_points(cell);
        let j = pts.iter().position(|&p| p == p1).expect("linked cell");
        let v1 = pts[(j + 1) % 3];
        let v2 = pts[(j + 2) % 3];
        let x1 = points[v1].flattened();
        let x2 = points[v2].flattened();

        let sign_x1 = plane_eval(split_normal, p1x, &x1) > 0.0;
        let sign_x2 = plane_eval(split_normal, p1x, &x2) > 0.0;
        if sign_x1 == sign_x2 {
            continue;
        }

        // The candidate edge (v1, v2) must itself separate p1 from p2.
        let sep_normal = edge_plane_normal(&x1, &x2)
            .ok_or(RecoverEdgeError::DegenerateEdge { p: v1 })?;
        let sign_p1 = plane_eval(sep_normal, &x1, p1x) > 0.0;
        let sign_p2 = plane_eval(sep_normal, &x1, p2x) > 0.0;
        if sign_p1 != sign_p2 {
            found = Some((cell, v1, v2, sign_x1));
            break;
        }
    }
    let (mut cell, mut v1, mut v2, sign_x1) =
        found.ok_or(RecoverEdgeError::NoSeparatingTriangle { p1, p2 })?;

    let mut tris = vec![cell];
    let mut right_chain = vec![p1];
    let mut left_chain = vec![p1];
    if sign_x1 {
        right_chain.push(v1);
        left_chain.push(v2);
    } else {
        left_chain.push(v1);
        right_chain.push(v2);
    }

    // Walk edge neighbors toward p2.
    while v1 != p2 {
        let neighbors = mesh.edge_neighbors(Some(cell), v1, v2);
        if neighbors.len() != 1 {
            return Err(RecoverEdgeError::NonManifoldEdge { a: v1, b: v2 });
        }
        cell = neighbors[0];
        tris.push(cell);

        let opposite = mesh.opposite_vertex(cell, v1, v2);
        if opposite == p2 {
            right_chain.push(p2);
            left_chain.push(p2);
            v1 = p2; // stops the walk
        } else {
            let x = points[opposite].flattened();
            if plane_eval(split_normal, p1x, &x) > 0.0 {
                v1 = opposite;
                right_chain.push(opposite);
            } else {
                v2 = opposite;
                left_chain.push(opposite);
            }
        }
    }

    Ok(Corridor {
        tris,
        left_chain,
        right_chain,
    })
}

/// Triangulate one influence-polygon half, mapping chain positions back to
/// mesh point ids.
fn triangulate_chain(
    points: &[Point],
    chain: &[usize],
    tolerance: f64,
) -> Result<Vec<[usize; 3]>, RecoverEdgeError> {
    let coords: Vec<[f64; 2]> = chain
        .iter()
        .map(|&p| [points[p].x(), points[p].y()])
        .collect();
    let tris = bounded_triangulate(&coords, tolerance)?;
    Ok(tris
        .into_iter()
        .map(|t| [chain[t[0]], chain[t[1]], chain[t[2]]])
        .collect())
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
