//! Collection aliases tuned for the triangulation's access patterns.
//!
//! Internal maps and sets never see attacker-controlled keys, so everything
//! hashes with `FxHasher`. Per-vertex incidence lists and neighbor lookups
//! are small nearly always; they stay on the stack via `SmallBuffer`.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Fast non-cryptographic `HashMap` for internal mappings.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast non-cryptographic `HashSet` for internal membership tests.
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-size-optimized buffer; stays on the stack up to `N` elements.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Create a [`FastHashMap`] with pre-reserved capacity.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

/// Create a [`FastHashSet`] with pre-reserved capacity.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}
