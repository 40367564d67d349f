//! Entity types of a simplicial complex.
//!
//! Every entity is addressed by an integer id issued from a per-kind, monotonically
//! increasing counter owned by the [`SimplicialComplex`](crate::core::complex::SimplicialComplex).
//! Ids are never reused, so a removed id stays invalid for the rest of a run.
//!
//! Adjacency between entities is expressed through ids only; no entity holds a reference to
//! another.

use crate::core::edge::EdgeKey;
use crate::core::facet::FaceKey;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! simplex_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw id value.
            #[inline]
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw id value.
            #[inline]
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

simplex_id!(
    /// Identifier of a vertex (0-simplex). A vertex carries no data beyond its id.
    VertexId,
    "v"
);
simplex_id!(
    /// Identifier of an edge (1-simplex).
    EdgeId,
    "e"
);
simplex_id!(
    /// Identifier of a triangular face (2-simplex).
    FaceId,
    "f"
);
simplex_id!(
    /// Identifier of a tetrahedron (3-simplex).
    TetId,
    "t"
);
simplex_id!(
    /// Identifier of a derived half-edge. Only valid until the next half-edge rebuild.
    HalfEdgeId,
    "h"
);

/// Dimension of a complex: triangulated surfaces or tetrahedral volumes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Triangles are the top simplices.
    #[default]
    Two,
    /// Tetrahedra are the top simplices.
    Three,
}

impl Dimension {
    /// Returns the dimension as a number (2 or 3).
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.as_usize())
    }
}

/// Coarse kind of a simplex, used in error reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimplexKind {
    /// 0-simplex
    Vertex,
    /// 1-simplex
    Edge,
    /// 2-simplex
    Face,
    /// 3-simplex
    Tetrahedron,
}

impl fmt::Display for SimplexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Face => "face",
            Self::Tetrahedron => "tetrahedron",
        };
        f.write_str(name)
    }
}

/// An edge with its canonical (sorted) endpoint pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    id: EdgeId,
    key: EdgeKey,
}

impl Edge {
    pub(crate) const fn new(id: EdgeId, key: EdgeKey) -> Self {
        Self { id, key }
    }

    /// Returns the edge id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EdgeId {
        self.id
    }

    /// Returns the canonical key.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> EdgeKey {
        self.key
    }

    /// Returns the endpoints in canonical order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 2] {
        [self.key.v0(), self.key.v1()]
    }

    /// Returns `true` if `vertex` is an endpoint.
    #[inline]
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.key.contains(vertex)
    }
}

/// A triangular face. The vertex triple keeps the order it was created with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    id: FaceId,
    vertices: [VertexId; 3],
}

impl Face {
    pub(crate) const fn new(id: FaceId, vertices: [VertexId; 3]) -> Self {
        Self { id, vertices }
    }

    /// Returns the face id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> FaceId {
        self.id
    }

    /// Returns the vertices in creation order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    /// Returns the canonical key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> FaceKey {
        FaceKey::from(self.vertices)
    }

    /// Returns `true` if `vertex` is a corner of this face.
    #[inline]
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Returns `true` if the directed edge `from → to` appears in the vertex cycle.
    #[must_use]
    pub fn has_directed_edge(&self, from: VertexId, to: VertexId) -> bool {
        let v = self.vertices;
        (0..3).any(|i| v[i] == from && v[(i + 1) % 3] == to)
    }

    /// Returns the three edges as canonical keys, in cycle order `(v0,v1)`, `(v1,v2)`, `(v2,v0)`.
    #[must_use]
    pub fn edge_keys(&self) -> [EdgeKey; 3] {
        let [a, b, c] = self.vertices;
        [EdgeKey::new(a, b), EdgeKey::new(b, c), EdgeKey::new(c, a)]
    }

    /// Returns the corner not on `edge`, if `edge` is one of this face's edges.
    #[must_use]
    pub fn opposite_vertex(&self, edge: EdgeKey) -> Option<VertexId> {
        if !edge.endpoints_in(&self.vertices) {
            return None;
        }
        self.vertices.iter().copied().find(|&v| !edge.contains(v))
    }
}

/// A tetrahedron. The vertex quadruple keeps the order it was created with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tetrahedron {
    id: TetId,
    vertices: [VertexId; 4],
}

impl Tetrahedron {
    pub(crate) const fn new(id: TetId, vertices: [VertexId; 4]) -> Self {
        Self { id, vertices }
    }

    /// Returns the tetrahedron id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> TetId {
        self.id
    }

    /// Returns the vertices in creation order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 4] {
        self.vertices
    }

    /// Returns `true` if `vertex` is a corner of this tetrahedron.
    #[inline]
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Returns the four bounding vertex triples.
    ///
    /// The order is `[v0,v1,v2]`, `[v0,v1,v3]`, `[v0,v2,v3]`, `[v1,v2,v3]`.
    #[must_use]
    pub const fn face_triples(&self) -> [[VertexId; 3]; 4] {
        tetrahedron_face_triples(self.vertices)
    }

    /// Returns the four bounding faces as canonical keys.
    #[must_use]
    pub fn face_keys(&self) -> [FaceKey; 4] {
        self.face_triples().map(FaceKey::from)
    }

    /// Returns the six edges as canonical keys.
    #[must_use]
    pub fn edge_keys(&self) -> [EdgeKey; 6] {
        tetrahedron_edge_keys(self.vertices)
    }

    /// Returns the corner not on `face`, if `face` bounds this tetrahedron.
    #[must_use]
    pub fn opposite_vertex(&self, face: FaceKey) -> Option<VertexId> {
        let mut outside = self.vertices.iter().copied().filter(|&v| !face.contains(v));
        let opposite = outside.next()?;
        outside.next().is_none().then_some(opposite)
    }
}

/// Bounding triples of a vertex quadruple.
#[must_use]
pub const fn tetrahedron_face_triples([a, b, c, d]: [VertexId; 4]) -> [[VertexId; 3]; 4] {
    [[a, b, c], [a, b, d], [a, c, d], [b, c, d]]
}

/// Edges of a vertex quadruple.
#[must_use]
pub fn tetrahedron_edge_keys([a, b, c, d]: [VertexId; 4]) -> [EdgeKey; 6] {
    [
        EdgeKey::new(a, b),
        EdgeKey::new(a, c),
        EdgeKey::new(a, d),
        EdgeKey::new(b, c),
        EdgeKey::new(b, d),
        EdgeKey::new(c, d),
    ]
}
