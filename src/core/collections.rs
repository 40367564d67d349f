//! Collection aliases used by the complex indices.
//!
//! Index maps are keyed by small `Copy` keys ([`EdgeKey`](crate::core::edge::EdgeKey),
//! [`FaceKey`](crate::core::facet::FaceKey), ids), so the non-cryptographic Fx hasher from
//! `rustc-hash` is used throughout. Entity collections themselves are ordered maps so that
//! iteration follows creation order.

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Optimized `HashMap` type for index lookups.
///
/// # Examples
///
/// ```rust
/// use pachner::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(7, 1);
/// assert_eq!(map.get(&7), Some(&1));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Optimized `HashSet` type for membership tests during scans.
pub type FastHashSet<T> = FxHashSet<T>;

/// Stack-allocated buffer for short lists such as the tetrahedra incident to a face.
///
/// Spills to the heap beyond `N` elements.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Number of tetrahedra a face may be shared by in a manifold complex.
pub const MAX_TETS_PER_FACE: usize = 2;

/// Incident-tetrahedra list for one face.
pub type FaceTets = SmallBuffer<crate::core::simplex::TetId, MAX_TETS_PER_FACE>;

/// Creates a [`FastHashMap`] with the given capacity.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FxBuildHasher)
}

/// Creates a [`FastHashSet`] with the given capacity.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FxBuildHasher)
}
