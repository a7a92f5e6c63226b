//! Alpha-shape filtering.
//!
//! With a positive alpha radius, only simplices "denser" than alpha survive:
//! triangles keep their place if their circumradius is at most alpha, edges
//! of removed triangles are demoted to free line segments if their
//! half-length is at most alpha, and points left incident to nothing are
//! emitted as free vertices.
//!
//! Radii are measured in the *original* coordinate space: a simplex whose
//! corners are all input points reads the untransformed input coordinates
//! (projected to a local in-plane frame, since the input may be non-planar),
//! while a simplex touching a bounding-ring point falls back to the working
//! coordinates, where the ring actually exists.

use crate::core::mesh::{Mesh, TriClass, TriClasses};
use crate::geometry::point::Point;
use crate::geometry::predicates::{circumcircle, project_to_2d};

/// Free edges and vertices produced by alpha filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlphaShape {
    /// Edges short enough to survive on their own.
    pub lines: Vec<[usize; 2]>,
    /// Points incident to no surviving triangle or line.
    pub verts: Vec<usize>,
}

/// Demote triangles, edges, and vertices that fail the alpha criterion.
///
/// `working` holds the transformed coordinates including the ring points;
/// `input` the original input coordinates. `include_ring` mirrors the
/// output's bounding-triangulation setting: ring-incident edges and the ring
/// vertices only participate when the ring itself is part of the output.
pub fn apply_alpha(
    mesh: &Mesh,
    working: &[Point],
    input: &[Point],
    alpha: f64,
    include_ring: bool,
    classes: &mut TriClasses,
) -> AlphaShape {
    let num_input = input.len();
    let alpha2 = alpha * alpha;
    let mut point_use = vec![false; working.len()];
    let mut shape = AlphaShape::default();

    // Triangles: circumradius in a local in-plane frame of the original
    // coordinates (the input may live on a non-planar surface).
    for (key, pts) in mesh.cells() {
        if classes[key] != TriClass::Keep {
            continue;
        }
        let coords = simplex_coords(&pts, working, input);
        let [a, b, c] = project_to_2d(&coords[0], &coords[1], &coords[2]);
        let (_, radius2) = circumcircle(
            &Point::xy(a[0], a[1]),
            &Point::xy(b[0], b[1]),
            &Point::xy(c[0], c[1]),
        );
        if radius2 > alpha2 {
            classes.insert(key, TriClass::Discard);
        } else {
            for p in pts {
                point_use[p] = true;
            }
        }
    }

    // Edges of removed triangles. Each candidate edge is examined once: it
    // qualifies when its far side is either open or another removed triangle
    // with a larger key (the key comparison de-duplicates the pair).
    for (key, pts) in mesh.cells() {
        if classes[key] == TriClass::Keep {
            continue;
        }
        for i in 0..3 {
            let ap1 = pts[i];
            let ap2 = pts[(i + 1) % 3];
            if !include_ring && (ap1 >= num_input || ap2 >= num_input) {
                continue;
            }
            let neighbors = mesh.edge_neighbors(Some(key), ap1, ap2);
            let exposed = match neighbors.first() {
                None => true,
                Some(&nei) => nei > key && classes[nei] != TriClass::Keep,
            };
            if !exposed {
                continue;
            }

            let (x1, x2) = if ap1 < num_input && ap2 < num_input {
                (&input[ap1], &input[ap2])
            } else {
                (&working[ap1], &working[ap2])
            };
            if x1.distance2(x2) * 0.25 <= alpha2 {
                point_use[ap1] = true;
                point_use[ap2] = true;
                shape.lines.push([ap1, ap2]);
            }
        }
    }

    // Vertices incident to nothing surviving.
    for (p, used) in point_use.iter().enumerate() {
        if (p < num_input || include_ring) && !used {
            shape.verts.push(p);
        }
    }

    shape
}

/// Coordinates of one triangle, preferring the untransformed input space
/// when no ring point is involved.
fn simplex_coords(pts: &[usize; 3], working: &[Point], input: &[Point]) -> [Point; 3] {
    let n = input.len();
    if pts.iter().all(|&p| p < n) {
        [input[pts[0]], input[pts[1]], input[pts[2]]]
    } else {
        [working[pts[0]], working[pts[1]], working[pts[2]]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::TriClasses;

    /// Two triangles: a small one and a long sliver with a huge circumradius.
    fn mesh_with_classes() -> (Mesh, Vec<Point>, TriClasses) {
        let points = vec![
            Point::xy(0.0, 0.0),
            Point::xy(0.4, 0.0),
            Point::xy(0.2, 0.3),
            Point::xy(8.0, 0.1),
        ];
        let mut mesh = Mesh::with_capacity(points.len(), 2);
        mesh.insert_linked_cell([0, 1, 2]);
        mesh.insert_linked_cell([1, 3, 2]);
        let mut classes = TriClasses::new();
        for (key, _) in mesh.cells() {
            classes.insert(key, TriClass::Keep);
        }
        (mesh, points, classes)
    }

    #[test]
    fn oversized_triangles_are_removed() {
        let (mesh, points, mut classes) = mesh_with_classes();
        let shape = apply_alpha(&mesh, &points, &points, 0.5, false, &mut classes);

        let kept: Vec<_> = mesh
            .cells()
            .filter(|(k, _)| classes[*k] == TriClass::Keep)
            .map(|(_, pts)| pts)
            .collect();
        assert_eq!(kept, vec![[0, 1, 2]]);
        // Point 3 survives as a free vertex; no edge of the sliver is short
        // enough except (1, 2), whose far side is the kept triangle.
        assert_eq!(shape.verts, vec![3]);
        assert!(shape.lines.is_empty());
    }

    #[test]
    fn short_exposed_edges_become_lines() {
        let (mesh, points, mut classes) = mesh_with_classes();
        // Alpha below the small triangle's circumradius (~0.217) removes both
        // triangles; its three edges all have half-length <= 0.2 and come
        // back as lines.
        let shape = apply_alpha(&mesh, &points, &points, 0.2, false, &mut classes);

        for (key, _) in mesh.cells() {
            assert_eq!(classes[key], TriClass::Discard);
        }
        let mut lines = shape.lines.clone();
        for l in &mut lines {
            l.sort_unstable();
        }
        lines.sort_unstable();
        assert_eq!(lines, vec![[0, 1], [0, 2], [1, 2]]);
    }

    #[test]
    fn zero_alpha_like_small_alpha_emits_all_verts() {
        let (mesh, points, mut classes) = mesh_with_classes();
        let shape = apply_alpha(&mesh, &points, &points, 1e-9, false, &mut classes);
        assert_eq!(shape.verts, vec![0, 1, 2, 3]);
        assert!(shape.lines.is_empty());
    }
}
