//! The mutable planar triangle complex.
//!
//! Cells live in a slotmap arena, so a triangle's identity ([`TriangleKey`])
//! survives in-place vertex replacement; the insertion and flip machinery
//! rewrites triangles constantly and every incidence list refers to them by
//! key. The mesh keeps two views consistent:
//!
//! - cell → points: each cell stores its vertex triple;
//! - point → cells: a per-point incidence list of cell keys.
//!
//! The low-level edit operations mirror that split. [`Mesh::replace_cell`]
//! rewrites a triple *without* touching incidence lists; callers pair it with
//! [`Mesh::add_reference`] / [`Mesh::remove_reference`] to keep both sides in
//! step. [`Mesh::insert_linked_cell`] and [`Mesh::replace_linked_cell`] do
//! the bookkeeping for the common cases.
//!
//! Point coordinates are *not* stored here; the mesh deals purely in point
//! indices and borrows coordinates at the call sites that need them.

use slotmap::{new_key_type, Key, SecondaryMap, SlotMap};

use crate::core::collections::SmallBuffer;

new_key_type! {
    /// Stable identity of a triangle in the mesh arena.
    pub struct TriangleKey;
}

/// Per-point incidence list. Interior vertices of a planar triangulation
/// typically touch about six triangles.
pub type CellList = SmallBuffer<TriangleKey, 8>;

/// Edge-neighbor query result; at most two cells share an edge in a
/// manifold mesh.
pub type NeighborList = SmallBuffer<TriangleKey, 2>;

/// Survival classification of a cell, threaded through constraint fill,
/// alpha filtering, and output assembly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriClass {
    /// Emitted to the output (also the initial state: unvisited).
    #[default]
    Keep,
    /// Excluded from the output.
    Discard,
    /// Tentatively inside a constraint polygon; promoted to [`TriClass::Keep`]
    /// once the fill completes.
    Pending,
}

/// Map from cell key to its survival classification.
pub type TriClasses = SecondaryMap<TriangleKey, TriClass>;

/// A mutable triangle mesh over externally owned points.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    cells: SlotMap<TriangleKey, [usize; 3]>,
    links: Vec<CellList>,
}

impl Mesh {
    /// Create a mesh over `num_points` points, reserving roughly
    /// `cells_hint` cells.
    #[must_use]
    pub fn with_capacity(num_points: usize, cells_hint: usize) -> Self {
        Self {
            cells: SlotMap::with_capacity_and_key(cells_hint),
            links: vec![CellList::new(); num_points],
        }
    }

    /// Number of cells ever inserted (cells are never removed).
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Iterate cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (TriangleKey, [usize; 3])> + '_ {
        self.cells.iter().map(|(k, pts)| (k, *pts))
    }

    /// Key of the first cell inserted, used to seed walks.
    #[must_use]
    pub fn first_cell(&self) -> Option<TriangleKey> {
        self.cells.keys().next()
    }

    /// The vertex triple of a cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is not in the mesh (a caller contract violation).
    #[must_use]
    pub fn cell_points(&self, cell: TriangleKey) -> [usize; 3] {
        self.cells[cell]
    }

    /// The cells incident to a point.
    #[must_use]
    pub fn point_cells(&self, point: usize) -> &[TriangleKey] {
        &self.links[point]
    }

    /// Deterministic per-cell value in `{0, 1, 2}`, derived from the key bits.
    ///
    /// The walk rotates its edge-evaluation order by this amount so that
    /// symmetric configurations cannot trap it in a cycle; deriving it from
    /// the key keeps runs reproducible.
    #[must_use]
    pub fn rotation_seed(cell: TriangleKey) -> usize {
        let bits = cell.data().as_ffi();
        ((bits ^ (bits >> 32)) % 3) as usize
    }

    /// Append a new cell and register it in all three incidence lists.
    pub fn insert_linked_cell(&mut self, pts: [usize; 3]) -> TriangleKey {
        let key = self.cells.insert(pts);
        for p in pts {
            self.links[p].push(key);
        }
        key
    }

    /// Rewrite a cell's vertex triple *without* updating incidence lists.
    ///
    /// The caller is responsible for the matching [`Self::add_reference`] /
    /// [`Self::remove_reference`] calls.
    pub fn replace_cell(&mut self, cell: TriangleKey, pts: [usize; 3]) {
        self.cells[cell] = pts;
    }

    /// Rewrite a cell's vertex triple and register it with the new vertices.
    ///
    /// The old vertices must already have been unlinked (see
    /// [`Self::remove_cell_references`]).
    pub fn replace_linked_cell(&mut self, cell: TriangleKey, pts: [usize; 3]) {
        self.cells[cell] = pts;
        for p in pts {
            self.links[p].push(cell);
        }
    }

    /// Register `cell` in `point`'s incidence list.
    pub fn add_reference(&mut self, point: usize, cell: TriangleKey) {
        self.links[point].push(cell);
    }

    /// Remove `cell` from `point`'s incidence list.
    pub fn remove_reference(&mut self, point: usize, cell: TriangleKey) {
        if let Some(pos) = self.links[point].iter().position(|&c| c == cell) {
            self.links[point].swap_remove(pos);
        }
    }

    /// Unlink a cell from the incidence lists of all three of its vertices.
    pub fn remove_cell_references(&mut self, cell: TriangleKey) {
        for p in self.cells[cell] {
            self.remove_reference(p, cell);
        }
    }

    /// Reserve room for `extra` more cells in a point's incidence list.
    pub fn reserve_cell_list(&mut self, point: usize, extra: usize) {
        self.links[point].reserve(extra);
    }

    /// Cells sharing the edge (`a`, `b`), excluding `exclude` when given.
    ///
    /// With `exclude = Some(cell)` this returns the neighbor(s) of `cell`
    /// across that edge: zero entries on a boundary, one in a manifold mesh.
    /// With `exclude = None` it returns every cell on the edge.
    #[must_use]
    pub fn edge_neighbors(
        &self,
        exclude: Option<TriangleKey>,
        a: usize,
        b: usize,
    ) -> NeighborList {
        let mut out = NeighborList::new();
        for &cell in &self.links[a] {
            if Some(cell) == exclude {
                continue;
            }
            if self.cells[cell].contains(&b) {
                out.push(cell);
            }
        }
        out
    }

    /// Do points `a` and `b` form an edge of some cell?
    #[must_use]
    pub fn is_edge(&self, a: usize, b: usize) -> bool {
        self.links[a].iter().any(|&cell| self.cells[cell].contains(&b))
    }

    /// The vertex of `cell` that is on neither end of the edge (`a`, `b`).
    ///
    /// # Panics
    ///
    /// Panics if every vertex of the cell lies on the edge (a corrupt cell).
    #[must_use]
    pub fn opposite_vertex(&self, cell: TriangleKey, a: usize, b: usize) -> usize {
        let pts = self.cells[cell];
        *pts.iter()
            .find(|&&p| p != a && p != b)
            .expect("triangle with a repeated edge")
    }

    /// Check the two-way consistency of the incidence lists; used by tests.
    #[must_use]
    pub fn links_consistent(&self) -> bool {
        for (key, pts) in self.cells.iter() {
            for &p in pts {
                if !self.links[p].contains(&key) {
                    return false;
                }
            }
        }
        for (p, list) in self.links.iter().enumerate() {
            for &cell in list {
                match self.cells.get(cell) {
                    Some(pts) if pts.contains(&p) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles sharing the edge (1, 2).
    fn two_triangle_mesh() -> (Mesh, TriangleKey, TriangleKey) {
        let mut mesh = Mesh::with_capacity(4, 4);
        let t0 = mesh.insert_linked_cell([0, 1, 2]);
        let t1 = mesh.insert_linked_cell([1, 3, 2]);
        (mesh, t0, t1)
    }

    #[test]
    fn insert_links_all_vertices() {
        let (mesh, t0, t1) = two_triangle_mesh();
        assert_eq!(mesh.num_cells(), 2);
        assert_eq!(mesh.point_cells(0), &[t0]);
        assert_eq!(mesh.point_cells(3), &[t1]);
        assert_eq!(mesh.point_cells(1), &[t0, t1]);
        assert!(mesh.links_consistent());
    }

    #[test]
    fn edge_neighbors_excludes_and_includes() {
        let (mesh, t0, t1) = two_triangle_mesh();
        let nei = mesh.edge_neighbors(Some(t0), 1, 2);
        assert_eq!(nei.as_slice(), &[t1]);
        let both = mesh.edge_neighbors(None, 1, 2);
        assert_eq!(both.len(), 2);
        // Boundary edge has no neighbor.
        assert!(mesh.edge_neighbors(Some(t0), 0, 1).is_empty());
    }

    #[test]
    fn is_edge_and_opposite_vertex() {
        let (mesh, t0, _) = two_triangle_mesh();
        assert!(mesh.is_edge(1, 2));
        assert!(mesh.is_edge(2, 1));
        assert!(!mesh.is_edge(0, 3));
        assert_eq!(mesh.opposite_vertex(t0, 1, 2), 0);
    }

    #[test]
    fn replace_preserves_identity() {
        let (mut mesh, t0, _) = two_triangle_mesh();
        // Swap vertex 0 for a fresh vertex the raw way.
        mesh.remove_reference(0, t0);
        mesh.replace_cell(t0, [3, 1, 2]);
        mesh.add_reference(3, t0);

        assert_eq!(mesh.cell_points(t0), [3, 1, 2]);
        assert!(mesh.links_consistent());
    }

    #[test]
    fn replace_linked_cell_relinks() {
        let (mut mesh, t0, _) = two_triangle_mesh();
        mesh.remove_cell_references(t0);
        mesh.replace_linked_cell(t0, [0, 1, 3]);
        assert!(mesh.links_consistent());
        assert!(mesh.is_edge(0, 3));
    }

    #[test]
    fn rotation_seed_is_deterministic_and_small() {
        let (mesh, t0, t1) = two_triangle_mesh();
        let _ = mesh;
        assert!(Mesh::rotation_seed(t0) < 3);
        assert_eq!(Mesh::rotation_seed(t0), Mesh::rotation_seed(t0));
        let _ = Mesh::rotation_seed(t1);
    }
}
