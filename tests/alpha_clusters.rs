//! Alpha filtering across two well-separated clusters.
//!
//! Two jittered 5x5 grids ten units apart, alpha 0.5: every intra-cluster
//! triangle has a circumradius well under alpha, every triangle bridging the
//! gap has one far larger, so the output splits cleanly into two islands
//! with no alpha lines left over.

use delaunay2d::prelude::*;

const GRID: usize = 5;
const SPACING: f64 = 0.4;
const CLUSTER_OFFSET: f64 = 10.0;

/// Two 5x5 grids with a small deterministic jitter that breaks the grid's
/// exact cocircularity without growing any circumradius past alpha.
fn cluster_points() -> Vec<Point> {
    let mut pts = Vec::with_capacity(2 * GRID * GRID);
    for cluster in 0..2 {
        let x0 = cluster as f64 * CLUSTER_OFFSET;
        for i in 0..GRID {
            for j in 0..GRID {
                let k = (cluster * GRID * GRID + i * GRID + j) as f64;
                let jitter_x = ((k * 37.0) % 11.0 - 5.0) * 0.002;
                let jitter_y = ((k * 53.0) % 13.0 - 6.0) * 0.002;
                pts.push(Point::xy(
                    x0 + i as f64 * SPACING + jitter_x,
                    j as f64 * SPACING + jitter_y,
                ));
            }
        }
    }
    pts
}

#[test]
fn alpha_separates_the_clusters() {
    let points = cluster_points();
    let options = TriangulationOptionsBuilder::default()
        .alpha(0.5)
        .build()
        .unwrap();
    let mesh = triangulate(&points, &options, None).unwrap();

    assert!(!mesh.triangles.is_empty());

    let cluster_of = |p: usize| p / (GRID * GRID);
    for tri in &mesh.triangles {
        let c = cluster_of(tri[0]);
        assert!(
            tri.iter().all(|&p| cluster_of(p) == c),
            "triangle {tri:?} bridges the clusters"
        );
    }

    // Both clusters survive.
    assert!(mesh.triangles.iter().any(|t| cluster_of(t[0]) == 0));
    assert!(mesh.triangles.iter().any(|t| cluster_of(t[0]) == 1));

    // Intra-cluster edges all belong to kept triangles and inter-cluster
    // edges are far too long: no alpha lines, and no stranded vertices.
    assert!(mesh.alpha_lines.is_empty());
    assert!(mesh.alpha_verts.is_empty());
}

#[test]
fn zero_alpha_keeps_the_bridge() {
    let points = cluster_points();
    let mesh = triangulate(&points, &TriangulationOptions::default(), None).unwrap();

    // Without filtering, the convex hull is covered: some triangle bridges.
    let cluster_of = |p: usize| p / (GRID * GRID);
    assert!(mesh
        .triangles
        .iter()
        .any(|t| t.iter().any(|&p| cluster_of(p) == 0) && t.iter().any(|&p| cluster_of(p) == 1)));
    assert!(mesh.alpha_lines.is_empty());
    assert!(mesh.alpha_verts.is_empty());
}

#[test]
fn shrinking_alpha_never_adds_triangles() {
    let points = cluster_points();
    let triangles_at = |alpha: f64| {
        let options = TriangulationOptionsBuilder::default()
            .alpha(alpha)
            .build()
            .unwrap();
        let mesh = triangulate(&points, &options, None).unwrap();
        let mut set: Vec<[usize; 3]> = mesh
            .triangles
            .iter()
            .map(|t| {
                let mut t = *t;
                t.sort_unstable();
                t
            })
            .collect();
        set.sort_unstable();
        set
    };

    let coarse = triangles_at(10.0);
    let mid = triangles_at(0.5);
    let fine = triangles_at(0.25);

    let subset = |small: &[[usize; 3]], big: &[[usize; 3]]| {
        small.iter().all(|t| big.binary_search(t).is_ok())
    };
    assert!(subset(&mid, &coarse));
    assert!(subset(&fine, &mid));
    assert!(fine.len() <= mid.len() && mid.len() <= coarse.len());
}
