//! Bounded triangulation of simple polygons by ear clipping.
//!
//! Constraint-edge recovery carves an influence region out of the mesh and
//! retriangulates its two boundary chains independently. Those chains are
//! plain simple polygons, so a bounded ear-clip triangulation is enough here
//! (the Delaunay quality of the replacement triangles is improved afterwards
//! by a flip pass). A polygon with `n` vertices always yields exactly
//! `n − 2` triangles or fails.

use smallvec::SmallVec;
use thiserror::Error;

use crate::geometry::predicates::point_in_triangle;

/// Why a polygon could not be triangulated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolygonError {
    /// Fewer than three vertices.
    #[error("polygon has {count} vertices, need at least 3")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },

    /// The polygon encloses (numerically) no area.
    #[error("polygon is degenerate (near-zero signed area)")]
    DegenerateArea,

    /// Ear clipping got stuck; the chain is self-intersecting or collapsed.
    #[error("no ear found with {remaining} vertices remaining")]
    NoEarFound {
        /// Vertices still unclipped when the search failed.
        remaining: usize,
    },
}

/// Triangulate a simple polygon given by its vertex chain.
///
/// Returns index triples into `chain`, wound the same way as the input
/// polygon. `tolerance` is an absolute in-plane distance used to reject
/// sliver ears whose apex grazes another chain vertex.
///
/// # Errors
///
/// Fails on chains with fewer than three vertices, chains with near-zero
/// enclosed area, and chains where clipping gets stuck (self-intersection).
pub fn bounded_triangulate(
    chain: &[[f64; 2]],
    tolerance: f64,
) -> Result<Vec<[usize; 3]>, PolygonError> {
    let n = chain.len();
    if n < 3 {
        return Err(PolygonError::TooFewVertices { count: n });
    }

    // Signed area fixes the winding; ears must agree with it.
    let mut area2 = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area2 += chain[i][0] * chain[j][1] - chain[j][0] * chain[i][1];
    }
    let orient = if area2 > 0.0 { 1.0 } else { -1.0 };

    let mut scale2: f64 = 0.0;
    for w in chain.windows(2) {
        let d2 = (w[1][0] - w[0][0]).powi(2) + (w[1][1] - w[0][1]).powi(2);
        scale2 = scale2.max(d2);
    }
    if area2.abs() <= scale2 * f64::EPSILON * 8.0 {
        return Err(PolygonError::DegenerateArea);
    }

    let mut remaining: SmallVec<[usize; 16]> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let mut clipped = false;

        for k in 0..m {
            let ia = remaining[(k + m - 1) % m];
            let ib = remaining[k];
            let ic = remaining[(k + 1) % m];
            let (a, b, c) = (chain[ia], chain[ib], chain[ic]);

            // Convex corner with respect to the polygon winding.
            let cross = (b[0] - a[0]) * (c[1] - b[1]) - (b[1] - a[1]) * (c[0] - b[0]);
            if cross * orient <= 0.0 {
                continue;
            }

            // No other remaining vertex may intrude into the candidate ear.
            let blocked = remaining.iter().any(|&iv| {
                iv != ia && iv != ib && iv != ic && point_in_triangle(chain[iv], a, b, c, tolerance)
            });
            if blocked {
                continue;
            }

            triangles.push([ia, ib, ic]);
            remaining.remove(k);
            clipped = true;
            break;
        }

        if !clipped {
            return Err(PolygonError::NoEarFound {
                remaining: remaining.len(),
            });
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    Ok(triangles)
}
