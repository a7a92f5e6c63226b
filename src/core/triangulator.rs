//! Configuration and the top-level triangulation driver.
//!
//! [`triangulate`] runs the whole pipeline: project the input points onto
//! the working plane, bootstrap the bounding triangulation, insert every
//! input point incrementally, recover constraint edges and classify polygon
//! interiors, filter by alpha, and assemble the output. A [`Triangulator`]
//! value wraps the same pipeline with a progress callback and a cooperative
//! abort flag for long runs.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::algorithms::constraints::recover_boundary;
use crate::core::algorithms::fill::fill_polygons;
use crate::core::algorithms::insertion::{insert_points, RunControl};
use crate::core::alpha::{apply_alpha, AlphaShape};
use crate::core::collections::FastHashSet;
use crate::core::mesh::{Mesh, TriClass, TriClasses};
use crate::core::output::{
    collect_triangles, drop_ring_triangles, rescue_orphans, AssemblyError,
};
use crate::geometry::point::{Bounds, Point};
use crate::geometry::projection::{best_fitting_plane, ProjectionPlane};

/// Number of bounding-ring points appended after the input points.
pub const RING_POINT_COUNT: usize = 8;

/// The six seed triangles over the eight ring points (offsets into the
/// ring), covering the ring's interior before any input point is inserted.
const SEED_TRIANGLES: [[usize; 3]; 6] = [
    [0, 1, 2],
    [2, 3, 4],
    [4, 5, 6],
    [6, 7, 0],
    [0, 2, 6],
    [2, 4, 6],
];

/// Tuning knobs of the triangulation. Construct one directly, via
/// [`Default`], or with the generated [`TriangulationOptionsBuilder`].
///
/// ```
/// use delaunay2d::core::triangulator::TriangulationOptionsBuilder;
///
/// let options = TriangulationOptionsBuilder::default()
///     .alpha(0.5)
///     .random_point_insertion(true)
///     .build()
///     .unwrap();
/// assert_eq!(options.alpha, 0.5);
/// assert_eq!(options.tolerance, 1.0e-5);
/// ```
#[derive(Builder, Clone, Debug, Serialize, Deserialize)]
#[builder(default)]
pub struct TriangulationOptions {
    /// Alpha-shape circumradius cutoff in input-space units; `0.0` disables
    /// filtering.
    pub alpha: f64,

    /// Relative tolerance for duplicate-point and edge-proximity tests,
    /// applied as a multiplier on the input bounding-box diagonal.
    pub tolerance: f64,

    /// Bounding-ring radius as a multiple of the input diagonal.
    pub offset: f64,

    /// Keep the eight ring points and their triangles in the output.
    /// Ignored (with a warning) when a projection transform is in effect.
    pub bounding_triangulation: bool,

    /// Visit input points in a deterministic pseudo-random order instead of
    /// natural order.
    pub random_point_insertion: bool,

    /// How input points are mapped into the triangulation plane.
    pub projection: ProjectionPlane,
}

impl Default for TriangulationOptions {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            tolerance: 1.0e-5,
            offset: 1.0,
            bounding_triangulation: false,
            random_point_insertion: false,
            projection: ProjectionPlane::Xy,
        }
    }
}

/// Constraint polylines and polygons over input point indices.
///
/// Every consecutive index pair of a polyline, and every boundary edge of a
/// polygon (closing edge included), is an edge the triangulation must
/// contain. Polygons additionally classify triangles: the first polygon
/// bounds the kept region, subsequent polygons carve holes out of it.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSource {
    polylines: Vec<Vec<usize>>,
    polygons: Vec<Vec<usize>>,
    edges: FastHashSet<(usize, usize)>,
}

impl ConstraintSource {
    /// Build a constraint source, indexing every constrained edge for
    /// `is_edge` lookups.
    #[must_use]
    pub fn new(polylines: Vec<Vec<usize>>, polygons: Vec<Vec<usize>>) -> Self {
        let mut edges = FastHashSet::default();
        for line in &polylines {
            for pair in line.windows(2) {
                edges.insert(ordered(pair[0], pair[1]));
            }
        }
        for poly in &polygons {
            for i in 0..poly.len() {
                edges.insert(ordered(poly[i], poly[(i + 1) % poly.len()]));
            }
        }
        Self {
            polylines,
            polygons,
            edges,
        }
    }

    /// Is (`a`, `b`) a constrained edge (in either direction)?
    #[must_use]
    pub fn is_edge(&self, a: usize, b: usize) -> bool {
        self.edges.contains(&ordered(a, b))
    }

    /// The constraint polylines.
    #[must_use]
    pub fn polylines(&self) -> &[Vec<usize>] {
        &self.polylines
    }

    /// The constraint polygons.
    #[must_use]
    pub fn polygons(&self) -> &[Vec<usize>] {
        &self.polygons
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Counters and flags describing how a run went. All of these are
/// diagnostics, not errors: the run still succeeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangulationDiagnostics {
    /// Input points skipped because they coincide with an earlier point.
    pub duplicate_points: usize,
    /// Input points skipped because location could not be resolved.
    pub degeneracies: usize,
    /// Constraint edges that could not be carved into the mesh.
    pub unrecovered_edges: usize,
    /// Constraint polygons whose fill was skipped over a missing edge.
    pub skipped_polygon_fills: usize,
    /// Diagonal swaps performed by the orphan-rescue pass.
    pub orphan_swaps: usize,
    /// Flip cascades cut short by the recursion depth bound.
    pub flip_depth_exhaustions: usize,
    /// Whether the run was cancelled through the abort flag.
    pub aborted: bool,
}

/// The assembled result: points, surviving triangles, and (when alpha
/// filtering is active) free line segments and vertices.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TriangulatedMesh {
    /// Output points. Equal to the input point set, except that with
    /// `bounding_triangulation` on (and no transform) the eight ring points
    /// are appended.
    pub points: Vec<Point>,
    /// Surviving triangles as point-index triples.
    pub triangles: Vec<[usize; 3]>,
    /// Alpha-shape line segments (empty when alpha is disabled).
    pub alpha_lines: Vec<[usize; 2]>,
    /// Alpha-shape free vertices (empty when alpha is disabled).
    pub alpha_verts: Vec<usize>,
    /// Run diagnostics.
    pub diagnostics: TriangulationDiagnostics,
}

/// A failed run. Everything recoverable is a diagnostic instead; this enum
/// only carries contract violations.
#[derive(Debug, Error)]
pub enum TriangulationError {
    /// The mesh broke its manifold contract during output assembly.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Triangulate `points` with the given options and optional constraints.
///
/// Fewer than three input points yields an empty (but successful) result
/// with the points passed through.
///
/// # Errors
///
/// [`TriangulationError`] only on a mesh-consistency contract violation;
/// degenerate inputs and unrecoverable constraints are reported through
/// [`TriangulationDiagnostics`] instead.
///
/// # Examples
///
/// ```
/// use delaunay2d::core::triangulator::{triangulate, TriangulationOptions};
/// use delaunay2d::geometry::point::Point;
///
/// let square = vec![
///     Point::xy(0.0, 0.0),
///     Point::xy(1.0, 0.0),
///     Point::xy(1.0, 1.0),
///     Point::xy(0.0, 1.0),
/// ];
/// let mesh = triangulate(&square, &TriangulationOptions::default(), None).unwrap();
/// assert_eq!(mesh.triangles.len(), 2);
/// assert_eq!(mesh.points.len(), 4);
/// ```
pub fn triangulate(
    points: &[Point],
    options: &TriangulationOptions,
    constraints: Option<&ConstraintSource>,
) -> Result<TriangulatedMesh, TriangulationError> {
    Triangulator::new(options.clone()).triangulate(points, constraints)
}

/// The pipeline with run-control attached: an optional progress callback and
/// an optional cooperative abort flag, both polled every thousand points.
#[derive(Default)]
pub struct Triangulator {
    options: TriangulationOptions,
    abort: Option<Arc<AtomicBool>>,
    progress: Option<Box<dyn FnMut(f64)>>,
}

impl std::fmt::Debug for Triangulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Triangulator")
            .field("options", &self.options)
            .field("abort", &self.abort.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Triangulator {
    /// Create a triangulator with the given options.
    #[must_use]
    pub fn new(options: TriangulationOptions) -> Self {
        Self {
            options,
            abort: None,
            progress: None,
        }
    }

    /// Attach a cancellation flag; raising it makes the run return early
    /// with a structurally valid partial result.
    #[must_use]
    pub fn with_abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Attach a progress sink, called with the fraction of points inserted.
    #[must_use]
    pub fn with_progress(mut self, progress: impl FnMut(f64) + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Run the pipeline. See [`triangulate`].
    ///
    /// # Errors
    ///
    /// [`TriangulationError`] on a mesh-consistency contract violation.
    pub fn triangulate(
        &mut self,
        input: &[Point],
        constraints: Option<&ConstraintSource>,
    ) -> Result<TriangulatedMesh, TriangulationError> {
        let options = self.options.clone();
        let mut diag = TriangulationDiagnostics::default();
        let num_input = input.len();

        if num_input < 3 {
            debug!(num_input, "cannot triangulate, need at least 3 points");
            return Ok(TriangulatedMesh {
                points: input.to_vec(),
                ..TriangulatedMesh::default()
            });
        }

        debug!("generating 2D Delaunay triangulation");

        if options.bounding_triangulation {
            match options.projection {
                ProjectionPlane::Transform(_) => warn!(
                    "bounding triangulation cannot be used with an input transform; \
                     the output will not contain the bounding triangulation"
                ),
                ProjectionPlane::BestFitting => warn!(
                    "bounding triangulation cannot be used with the best-fitting plane \
                     option; the output will not contain the bounding triangulation"
                ),
                ProjectionPlane::Xy => {}
            }
        }

        // Project the input into the working plane. Constraint indices refer
        // to input points, so only the input is transformed.
        let transform = match &options.projection {
            ProjectionPlane::Xy => None,
            ProjectionPlane::BestFitting => Some(best_fitting_plane(input)),
            ProjectionPlane::Transform(t) => Some(t.clone()),
        };
        let mut working = match &transform {
            Some(t) => t.apply_all(input),
            None => input.to_vec(),
        };

        // The ring radius scales with the *input* diagonal; the ring center
        // sits at the working bounds center.
        let center = Bounds::of(&working).expect("non-empty input").center();
        let input_length = Bounds::of(input).expect("non-empty input").diagonal();
        let radius = options.offset * input_length;
        let bounding_radius2 = 4.0 * radius * radius;
        let tol = input_length * options.tolerance;

        let mut mesh = bootstrap(&mut working, num_input, center, radius);

        let mut control = RunControl {
            abort: self.abort.as_deref(),
            progress: self.progress.as_deref_mut(),
        };
        insert_points(
            &mut mesh,
            &working,
            num_input,
            tol,
            bounding_radius2,
            options.random_point_insertion,
            &mut diag,
            &mut control,
        );

        debug!(
            num_input,
            duplicates = diag.duplicate_points,
            "insertion finished"
        );
        if diag.degeneracies > 0 {
            warn!(
                degeneracies = diag.degeneracies,
                "degenerate point locations encountered, mesh quality suspect"
            );
        }

        let mut classes = TriClasses::new();
        for (key, _) in mesh.cells() {
            classes.insert(key, TriClass::Keep);
        }

        if let Some(source) = constraints {
            recover_boundary(
                &mut mesh,
                &working,
                num_input,
                source,
                bounding_radius2,
                options.tolerance,
                &mut diag,
            );
            diag.skipped_polygon_fills =
                fill_polygons(&mesh, &working, source.polygons(), &mut classes);
        }

        // The ring cannot be kept when a transform separates the working
        // space from the output space.
        let effective_bounding = options.bounding_triangulation && transform.is_none();

        if !effective_bounding {
            drop_ring_triangles(&mesh, num_input, &mut classes);
        }

        let mut alpha_shape = AlphaShape::default();
        if options.alpha > 0.0 {
            alpha_shape = apply_alpha(
                &mesh,
                &working,
                input,
                options.alpha,
                effective_bounding,
                &mut classes,
            );
        }

        if !effective_bounding && options.alpha == 0.0 && constraints.is_none() {
            rescue_orphans(&mut mesh, &working, num_input, &mut classes, &mut diag)?;
        }

        let keep_all =
            options.alpha <= 0.0 && effective_bounding && constraints.is_none();
        let triangles = collect_triangles(&mesh, &classes, keep_all);

        let points = if effective_bounding {
            working
        } else {
            input.to_vec()
        };

        Ok(TriangulatedMesh {
            points,
            triangles,
            alpha_lines: alpha_shape.lines,
            alpha_verts: alpha_shape.verts,
            diagnostics: diag,
        })
    }
}

/// Append the eight bounding-ring points to `working` and seed the mesh with
/// the six ring triangles.
fn bootstrap(working: &mut Vec<Point>, num_input: usize, center: [f64; 3], radius: f64) -> Mesh {
    working.reserve(RING_POINT_COUNT);
    for i in 0..RING_POINT_COUNT {
        let angle = (i as f64) * std::f64::consts::FRAC_PI_4;
        working.push(Point::new([
            center[0] + radius * angle.cos(),
            center[1] + radius * angle.sin(),
            center[2],
        ]));
    }

    let mut mesh = Mesh::with_capacity(num_input + RING_POINT_COUNT, 2 * num_input + 8);
    for tri in SEED_TRIANGLES {
        mesh.insert_linked_cell([
            num_input + tri[0],
            num_input + tri[1],
            num_input + tri[2],
        ]);
    }
    mesh
}
