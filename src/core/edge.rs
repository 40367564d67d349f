//! Canonical edge keys.
//!
//! An edge is identified in the indices purely by its two endpoint [`VertexId`]s. `EdgeKey`
//! canonicalizes endpoint ordering so `(a, b)` and `(b, a)` map to the same edge, which is what
//! makes `add_edge` idempotent.
//!
//! ## Determinism
//!
//! Vertex ids are issued monotonically, so `EdgeKey` ordering is stable across processes and
//! serialization round-trips.

use crate::core::simplex::VertexId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identifier for an (undirected) edge.
///
/// # Examples
///
/// ```rust
/// use pachner::core::edge::EdgeKey;
/// use pachner::core::simplex::VertexId;
///
/// let a = VertexId::new(5);
/// let b = VertexId::new(2);
/// let edge = EdgeKey::new(a, b);
/// assert_eq!(edge.endpoints(), [b, a]);
/// assert_eq!(edge, EdgeKey::new(b, a));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[VertexId; 2]", into = "[VertexId; 2]")]
pub struct EdgeKey {
    v0: VertexId,
    v1: VertexId,
}

impl EdgeKey {
    /// Creates a new canonical edge key.
    ///
    /// The endpoints are reordered so that `v0 <= v1`.
    #[must_use]
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// Returns the first (canonical) endpoint.
    #[inline]
    #[must_use]
    pub const fn v0(self) -> VertexId {
        self.v0
    }

    /// Returns the second (canonical) endpoint.
    #[inline]
    #[must_use]
    pub const fn v1(self) -> VertexId {
        self.v1
    }

    /// Returns the two endpoints in canonical order.
    #[inline]
    #[must_use]
    pub const fn endpoints(self) -> [VertexId; 2] {
        [self.v0, self.v1]
    }

    /// Returns `true` if the endpoints coincide.
    #[inline]
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.v0 == self.v1
    }

    /// Returns `true` if `vertex` is an endpoint.
    #[inline]
    #[must_use]
    pub fn contains(self, vertex: VertexId) -> bool {
        self.v0 == vertex || self.v1 == vertex
    }

    /// Returns `true` if both endpoints appear in `vertices`.
    #[inline]
    #[must_use]
    pub fn endpoints_in(self, vertices: &[VertexId]) -> bool {
        vertices.contains(&self.v0) && vertices.contains(&self.v1)
    }

    /// Returns the endpoint opposite to `vertex`, or `None` if `vertex` is not an endpoint.
    #[must_use]
    pub fn other(self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.v0 {
            Some(self.v1)
        } else if vertex == self.v1 {
            Some(self.v0)
        } else {
            None
        }
    }
}

impl From<(VertexId, VertexId)> for EdgeKey {
    #[inline]
    fn from((a, b): (VertexId, VertexId)) -> Self {
        Self::new(a, b)
    }
}

impl From<[VertexId; 2]> for EdgeKey {
    #[inline]
    fn from([a, b]: [VertexId; 2]) -> Self {
        Self::new(a, b)
    }
}

impl From<EdgeKey> for [VertexId; 2] {
    #[inline]
    fn from(key: EdgeKey) -> Self {
        [key.v0, key.v1]
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.v0, self.v1)
    }
}
