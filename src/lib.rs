//! # delaunay2d
//!
//! A 2D **constrained Delaunay triangulator with alpha-shape filtering** for
//! points in 3-space.
//!
//! Input points are projected onto a working plane (the xy-plane, a
//! best-fitting plane, or a caller-supplied plane transform) and inserted
//! incrementally into a bounding triangulation: each point is located by
//! walking the mesh, spliced into its containing triangle, and the Delaunay
//! property is restored by recursive edge flips. Optional constraint
//! polylines and polygons force edges into the result and classify triangles
//! as inside or outside; an optional alpha radius keeps only simplices dense
//! enough to pass the circumradius test.
//!
//! # Features
//!
//! - incremental insertion with deterministic walk-based point location
//! - constraint edge recovery by influence-polygon retriangulation
//! - polygon interior/exterior classification (holes supported)
//! - alpha-shape filtering producing triangles, free edges, and free points
//! - reproducible pseudo-random insertion order (GCD traversal, no RNG)
//! - cooperative cancellation and progress reporting for long runs
//!
//! # Basic usage
//!
//! ```rust
//! use delaunay2d::prelude::*;
//!
//! let points = vec![
//!     Point::xy(0.0, 0.0),
//!     Point::xy(1.0, 0.0),
//!     Point::xy(1.0, 1.0),
//!     Point::xy(0.0, 1.0),
//!     Point::xy(0.5, 0.5),
//! ];
//!
//! let mesh = triangulate(&points, &TriangulationOptions::default(), None).unwrap();
//!
//! // The interior point fans the square into four triangles.
//! assert_eq!(mesh.triangles.len(), 4);
//! assert_eq!(mesh.points.len(), 5);
//! assert_eq!(mesh.diagnostics.duplicate_points, 0);
//! ```
//!
//! # Constrained triangulation
//!
//! ```rust
//! use delaunay2d::prelude::*;
//!
//! let points = vec![
//!     Point::xy(0.0, 0.0),
//!     Point::xy(2.0, 0.0),
//!     Point::xy(2.0, 2.0),
//!     Point::xy(0.0, 2.0),
//!     Point::xy(1.0, 1.0),
//! ];
//! // The outer square as a constraint polygon: its four edges must appear,
//! // and triangles outside it are discarded.
//! let constraints = ConstraintSource::new(vec![], vec![vec![0, 1, 2, 3]]);
//!
//! let mesh = triangulate(&points, &TriangulationOptions::default(), Some(&constraints)).unwrap();
//! assert_eq!(mesh.diagnostics.unrecovered_edges, 0);
//! assert_eq!(mesh.triangles.len(), 4);
//! ```
//!
//! # Guarantees and failure behavior
//!
//! Nothing recoverable is an error. Duplicate points, degenerate locations,
//! and unrecoverable constraint edges are skipped, counted in
//! [`TriangulationDiagnostics`](core::triangulator::TriangulationDiagnostics),
//! and warned about through [`tracing`]; the run still succeeds. The only
//! `Err` a run can produce is a mesh-consistency contract violation during
//! output assembly.
//!
//! Fewer than three input points is not an error either: the result is empty
//! with the points passed through.
//!
//! # References
//!
//! - L. Guibas and J. Stolfi, "Primitives for the Manipulation of General
//!   Subdivisions and the Computation of Voronoi Diagrams", ACM TOG, 1985.
//! - C. L. Lawson, "Software for C1 surface interpolation", Mathematical
//!   Software III, 1977 (edge-flip restoration).
//! - H. Edelsbrunner, D. Kirkpatrick, R. Seidel, "On the shape of a set of
//!   points in the plane", IEEE Trans. Inf. Theory, 1983 (alpha shapes).

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Mesh data structure, insertion pipeline, and output assembly.
pub mod core {
    /// The algorithmic stages of a triangulation run.
    pub mod algorithms {
        /// Constraint edge recovery by corridor retriangulation.
        pub mod constraints;
        /// Interior/exterior flood classification from constraint polygons.
        pub mod fill;
        /// Delaunay restoration by recursive edge flips.
        pub mod flips;
        /// The incremental insertion loop and its traversal order.
        pub mod insertion;
        /// Walk-based point location.
        pub mod locate;
    }
    /// Alpha-shape filtering of the finished triangulation.
    pub mod alpha;
    /// Collection aliases tuned for the mesh's access patterns.
    pub mod collections;
    pub mod mesh;
    /// Ring removal, orphan rescue, and final cell emission.
    pub mod output;
    pub mod triangulator;

    pub use mesh::*;
    pub use triangulator::*;
}

/// Points, predicates, plane projection, and polygon triangulation.
pub mod geometry {
    pub mod point;
    /// Ear-clip triangulation of simple polygons.
    pub mod polygon;
    pub mod predicates;
    /// Mapping input points onto the triangulation plane.
    pub mod projection;

    pub use point::*;
    pub use predicates::*;
    pub use projection::*;
}

/// Re-exports of the commonly used types and entry points.
pub mod prelude {
    pub use crate::core::mesh::{Mesh, TriClass, TriClasses, TriangleKey};
    pub use crate::core::triangulator::{
        triangulate, ConstraintSource, TriangulatedMesh, TriangulationDiagnostics,
        TriangulationError, TriangulationOptions, TriangulationOptionsBuilder, Triangulator,
    };
    pub use crate::geometry::point::{Bounds, Point};
    pub use crate::geometry::projection::{PlaneTransform, ProjectionPlane};
}
