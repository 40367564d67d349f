//! Canonical face keys.
//!
//! A triangular face is keyed by its sorted vertex triple. The same key type is used for the
//! face→face-id index and for the face→tetrahedra index, so a tetrahedron registers its bounding
//! faces without needing the faces to exist as entities.
//!
//! # Fundamental Invariant
//!
//! **In a manifold 3D complex each face is shared by at most two tetrahedra.** Interior faces
//! are shared by exactly two, boundary faces belong to exactly one.

use crate::core::edge::EdgeKey;
use crate::core::simplex::VertexId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identifier for a triangular face: its vertex triple sorted ascending.
///
/// # Examples
///
/// ```rust
/// use pachner::core::facet::FaceKey;
/// use pachner::core::simplex::VertexId;
///
/// let [a, b, c] = [VertexId::new(3), VertexId::new(1), VertexId::new(2)];
/// assert_eq!(FaceKey::new(a, b, c), FaceKey::new(c, a, b));
/// assert_eq!(FaceKey::new(a, b, c).vertices(), [b, c, a]);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[VertexId; 3]", into = "[VertexId; 3]")]
pub struct FaceKey([VertexId; 3]);

impl FaceKey {
    /// Creates a new canonical face key.
    #[must_use]
    pub fn new(a: VertexId, b: VertexId, c: VertexId) -> Self {
        let mut vertices = [a, b, c];
        vertices.sort_unstable();
        Self(vertices)
    }

    /// Returns the sorted vertex triple.
    #[inline]
    #[must_use]
    pub const fn vertices(self) -> [VertexId; 3] {
        self.0
    }

    /// Returns `true` if two of the vertices coincide.
    #[inline]
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        let [a, b, c] = self.0;
        a == b || b == c
    }

    /// Returns `true` if `vertex` is a corner of the face.
    #[inline]
    #[must_use]
    pub fn contains(self, vertex: VertexId) -> bool {
        self.0.contains(&vertex)
    }

    /// Returns `true` if `edge` is one of the three edges of the face.
    #[inline]
    #[must_use]
    pub fn contains_edge(self, edge: EdgeKey) -> bool {
        edge.endpoints_in(&self.0)
    }

    /// Returns the three edges of the face.
    #[must_use]
    pub fn edge_keys(self) -> [EdgeKey; 3] {
        let [a, b, c] = self.0;
        [EdgeKey::new(a, b), EdgeKey::new(a, c), EdgeKey::new(b, c)]
    }

    /// Returns the two corners other than `vertex`, or `None` if `vertex` is not a corner.
    #[must_use]
    pub fn others(self, vertex: VertexId) -> Option<[VertexId; 2]> {
        let [a, b, c] = self.0;
        if vertex == a {
            Some([b, c])
        } else if vertex == b {
            Some([a, c])
        } else if vertex == c {
            Some([a, b])
        } else {
            None
        }
    }
}

impl From<[VertexId; 3]> for FaceKey {
    #[inline]
    fn from([a, b, c]: [VertexId; 3]) -> Self {
        Self::new(a, b, c)
    }
}

impl From<FaceKey> for [VertexId; 3] {
    #[inline]
    fn from(key: FaceKey) -> Self {
        key.0
    }
}

impl fmt::Display for FaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "[{a}, {b}, {c}]")
    }
}
