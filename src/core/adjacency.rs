//! Incidence and adjacency queries.
//!
//! 3D adjacency is derived purely from the face→tetrahedra index: the neighbour of a
//! tetrahedron across a face is the other entry in that face's list. Nothing is cached, so
//! there is no rebuild step. Vertex and edge incidence is answered by scanning the entity
//! collections.
//!
//! [`IncidenceCounts`] gathers the per-vertex and per-edge counts that move selection needs
//! in a single pass instead of one scan per candidate.

use crate::core::collections::FastHashMap;
use crate::core::complex::SimplicialComplex;
use crate::core::edge::EdgeKey;
use crate::core::facet::FaceKey;
use crate::core::simplex::{EdgeId, FaceId, TetId, VertexId};

impl SimplicialComplex {
    /// Canonical keys of the four faces of a tetrahedron.
    #[must_use]
    pub fn tetrahedron_faces(&self, tet: TetId) -> Option<[FaceKey; 4]> {
        self.tetrahedron(tet).map(|t| t.face_keys())
    }

    /// Neighbour across each face of a tetrahedron, in
    /// [`face_triples`](crate::core::simplex::Tetrahedron::face_triples) order.
    /// `None` entries are boundary faces.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pachner::core::complex::SimplicialComplex;
    ///
    /// let complex = SimplicialComplex::tetrahedron_strip(2);
    /// let first = complex.tetrahedron_ids().next().unwrap();
    /// let neighbors = complex.tetrahedron_neighbors(first).unwrap();
    /// assert_eq!(neighbors.iter().flatten().count(), 1);
    /// ```
    #[must_use]
    pub fn tetrahedron_neighbors(&self, tet: TetId) -> Option<[Option<TetId>; 4]> {
        let keys = self.tetrahedron_faces(tet)?;
        Some(keys.map(|key| {
            self.face_tetrahedra_by_key(key)
                .iter()
                .copied()
                .find(|&other| other != tet)
        }))
    }

    /// Tetrahedra incident to a face, by face id.
    #[must_use]
    pub fn face_tetrahedra(&self, face: FaceId) -> &[TetId] {
        self.face(face)
            .map_or(&[], |f| self.face_tetrahedra_by_key(f.key()))
    }

    /// Tetrahedra having `vertex` as a corner.
    #[must_use]
    pub fn vertex_tetrahedra(&self, vertex: VertexId) -> Vec<TetId> {
        self.tetrahedra()
            .filter(|t| t.contains(vertex))
            .map(|t| t.id())
            .collect()
    }

    /// Tetrahedra containing both endpoints of `edge`.
    #[must_use]
    pub fn edge_tetrahedra(&self, edge: EdgeKey) -> Vec<TetId> {
        self.tetrahedra()
            .filter(|t| edge.endpoints_in(&t.vertices()))
            .map(|t| t.id())
            .collect()
    }

    /// Faces having `vertex` as a corner.
    #[must_use]
    pub fn vertex_faces(&self, vertex: VertexId) -> Vec<FaceId> {
        self.faces()
            .filter(|f| f.contains(vertex))
            .map(|f| f.id())
            .collect()
    }

    /// Faces containing both endpoints of `edge`.
    #[must_use]
    pub fn edge_faces(&self, edge: EdgeKey) -> Vec<FaceId> {
        self.faces()
            .filter(|f| edge.endpoints_in(&f.vertices()))
            .map(|f| f.id())
            .collect()
    }

    /// Edges having `vertex` as an endpoint.
    #[must_use]
    pub fn vertex_edges(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.edges()
            .filter(|e| e.contains(vertex))
            .map(|e| e.id())
            .collect()
    }
}

/// Per-vertex and per-edge incidence counts of faces and tetrahedra.
///
/// Edge counts are keyed by canonical key and include keys of edges that exist only
/// implicitly as sides of a face or tetrahedron.
#[derive(Clone, Debug, Default)]
pub struct IncidenceCounts {
    /// Faces per vertex.
    pub vertex_faces: FastHashMap<VertexId, usize>,
    /// Faces per edge key.
    pub edge_faces: FastHashMap<EdgeKey, usize>,
    /// Tetrahedra per vertex.
    pub vertex_tetrahedra: FastHashMap<VertexId, usize>,
    /// Tetrahedra per edge key.
    pub edge_tetrahedra: FastHashMap<EdgeKey, usize>,
}

impl IncidenceCounts {
    /// Counts incidences of every face and tetrahedron of `complex` in one pass each.
    #[must_use]
    pub fn compute(complex: &SimplicialComplex) -> Self {
        let mut counts = Self::default();
        for face in complex.faces() {
            for v in face.vertices() {
                *counts.vertex_faces.entry(v).or_default() += 1;
            }
            for key in face.edge_keys() {
                *counts.edge_faces.entry(key).or_default() += 1;
            }
        }
        for tet in complex.tetrahedra() {
            for v in tet.vertices() {
                *counts.vertex_tetrahedra.entry(v).or_default() += 1;
            }
            for key in tet.edge_keys() {
                *counts.edge_tetrahedra.entry(key).or_default() += 1;
            }
        }
        counts
    }

    /// Faces incident to `vertex`.
    #[must_use]
    pub fn faces_at_vertex(&self, vertex: VertexId) -> usize {
        self.vertex_faces.get(&vertex).copied().unwrap_or(0)
    }

    /// Faces incident to `edge`.
    #[must_use]
    pub fn faces_at_edge(&self, edge: EdgeKey) -> usize {
        self.edge_faces.get(&edge).copied().unwrap_or(0)
    }

    /// Tetrahedra incident to `vertex`.
    #[must_use]
    pub fn tetrahedra_at_vertex(&self, vertex: VertexId) -> usize {
        self.vertex_tetrahedra.get(&vertex).copied().unwrap_or(0)
    }

    /// Tetrahedra incident to `edge`.
    #[must_use]
    pub fn tetrahedra_at_edge(&self, edge: EdgeKey) -> usize {
        self.edge_tetrahedra.get(&edge).copied().unwrap_or(0)
    }
}
