//! The simplicial-complex entity store and its canonical-key indices.
//!
//! [`SimplicialComplex`] owns the vertex, edge, face and tetrahedron collections of one
//! complex together with three reverse indices:
//!
//! - edge key → edge id
//! - face key → face id
//! - face key → incident tetrahedra (at most two)
//!
//! # Deduplication
//!
//! `add_edge` and `add_face` are idempotent by canonical key: adding an edge or face that
//! already exists returns the existing id. `add_vertex` and `add_tetrahedron` always create.
//!
//! # Half-edges
//!
//! 2D complexes carry a derived [`HalfEdgeMesh`]. The raw add/remove methods do not touch it;
//! every composite operation in this crate (seeds, moves, growth) rebuilds it once its
//! mutation is complete. Callers composing their own edits should call
//! [`SimplicialComplex::rebuild_half_edges`] afterwards.
//!
//! # Serialization
//!
//! Only the primary data (dimension, entities, id counters) is serialized. All indices are
//! rebuilt on deserialization, and data violating the store invariants is rejected.

use crate::core::collections::{FaceTets, FastHashMap, MAX_TETS_PER_FACE};
use crate::core::edge::EdgeKey;
use crate::core::facet::FaceKey;
use crate::core::half_edge::HalfEdgeMesh;
use crate::core::simplex::{
    Dimension, Edge, EdgeId, Face, FaceId, SimplexKind, TetId, Tetrahedron, VertexId,
    tetrahedron_face_triples,
};
use crate::topology::characteristics::euler;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the entity store when an insertion or removal would break an invariant.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ComplexError {
    /// A simplex references a vertex that does not exist.
    #[error("Vertex {vertex} does not exist")]
    UnknownVertex {
        /// The missing vertex.
        vertex: VertexId,
    },
    /// A simplex repeats a vertex.
    #[error("Degenerate {kind}: repeated vertex in {vertices:?}")]
    DegenerateSimplex {
        /// Kind of the rejected simplex.
        kind: SimplexKind,
        /// Vertices as supplied.
        vertices: Vec<VertexId>,
    },
    /// A third tetrahedron would be registered on a face.
    #[error("Face {face} is already shared by two tetrahedra")]
    NonManifoldFace {
        /// The saturated face.
        face: FaceKey,
    },
    /// Tetrahedra were added to a 2D complex.
    #[error("Tetrahedra are not allowed in a {dimension} complex")]
    DimensionMismatch {
        /// Dimension of the complex.
        dimension: Dimension,
    },
    /// A vertex cannot be removed while simplices still reference it.
    #[error("Vertex {vertex} is still referenced by at least one {kind}")]
    VertexInUse {
        /// The vertex whose removal was requested.
        vertex: VertexId,
        /// Kind of the first referencing simplex found.
        kind: SimplexKind,
    },
    /// Serialized data contains the same id twice.
    #[error("Duplicate {kind} id {id}")]
    DuplicateId {
        /// Kind of the duplicated entity.
        kind: SimplexKind,
        /// The raw id.
        id: u64,
    },
    /// Serialized data contains two edges or faces with the same canonical key.
    #[error("Duplicate {kind} key {key}")]
    DuplicateKey {
        /// Kind of the duplicated entity.
        kind: SimplexKind,
        /// Display form of the key.
        key: String,
    },
    /// Serialized data contains an id the id counter has not issued yet.
    #[error("{kind} id {id} is not below the next id {next}")]
    IdOutOfRange {
        /// Kind of the entity.
        kind: SimplexKind,
        /// The raw id.
        id: u64,
        /// The counter value.
        next: u64,
    },
}

// =============================================================================
// ID COUNTERS
// =============================================================================

/// Next ids to issue, one monotonically increasing counter per entity kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    /// Next vertex id.
    pub vertex: u64,
    /// Next edge id.
    pub edge: u64,
    /// Next face id.
    pub face: u64,
    /// Next tetrahedron id.
    pub tetrahedron: u64,
}

impl IdCounters {
    const fn next_for(&self, kind: SimplexKind) -> u64 {
        match kind {
            SimplexKind::Vertex => self.vertex,
            SimplexKind::Edge => self.edge,
            SimplexKind::Face => self.face,
            SimplexKind::Tetrahedron => self.tetrahedron,
        }
    }
}

// =============================================================================
// SIMPLICIAL COMPLEX
// =============================================================================

/// A 2D or 3D simplicial complex with canonical-key indices.
///
/// # Examples
///
/// ```rust
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::core::simplex::Dimension;
///
/// let mut complex = SimplicialComplex::new(Dimension::Two);
/// let a = complex.add_vertex();
/// let b = complex.add_vertex();
/// let c = complex.add_vertex();
///
/// let e1 = complex.add_edge(a, b).unwrap();
/// let e2 = complex.add_edge(b, a).unwrap();
/// assert_eq!(e1, e2); // deduplicated by canonical key
///
/// let f = complex.add_face(a, b, c).unwrap();
/// assert_eq!(complex.add_face(c, a, b).unwrap(), f);
/// assert_eq!(complex.number_of_faces(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "ComplexData", try_from = "ComplexData")]
pub struct SimplicialComplex {
    dimension: Dimension,
    vertices: BTreeSet<VertexId>,
    edges: BTreeMap<EdgeId, Edge>,
    faces: BTreeMap<FaceId, Face>,
    tetrahedra: BTreeMap<TetId, Tetrahedron>,
    edge_index: FastHashMap<EdgeKey, EdgeId>,
    face_index: FastHashMap<FaceKey, FaceId>,
    face_to_tets: FastHashMap<FaceKey, FaceTets>,
    half_edges: HalfEdgeMesh,
    next_ids: IdCounters,
}

impl Default for SimplicialComplex {
    fn default() -> Self {
        Self::new(Dimension::default())
    }
}

/// Compares primary data only; indices and half-edges are derived from it.
impl PartialEq for SimplicialComplex {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.next_ids == other.next_ids
            && self.vertices == other.vertices
            && self.edges == other.edges
            && self.faces == other.faces
            && self.tetrahedra == other.tetrahedra
    }
}

impl Eq for SimplicialComplex {}

impl SimplicialComplex {
    /// Creates an empty complex of the given dimension.
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            vertices: BTreeSet::new(),
            edges: BTreeMap::new(),
            faces: BTreeMap::new(),
            tetrahedra: BTreeMap::new(),
            edge_index: FastHashMap::default(),
            face_index: FastHashMap::default(),
            face_to_tets: FastHashMap::default(),
            half_edges: HalfEdgeMesh::default(),
            next_ids: IdCounters::default(),
        }
    }

    /// Dimension of the complex.
    #[inline]
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Current id counters.
    #[inline]
    #[must_use]
    pub const fn id_counters(&self) -> IdCounters {
        self.next_ids
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    /// Adds a new vertex. Always creates.
    pub fn add_vertex(&mut self) -> VertexId {
        let id = VertexId::new(self.next_ids.vertex);
        self.next_ids.vertex += 1;
        self.vertices.insert(id);
        id
    }

    /// Adds the edge `{a, b}`, or returns the id of the existing edge with that key.
    ///
    /// # Errors
    ///
    /// Returns [`ComplexError::UnknownVertex`] or [`ComplexError::DegenerateSimplex`].
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId, ComplexError> {
        let key = self.checked_edge_key(a, b)?;
        if let Some(&existing) = self.edge_index.get(&key) {
            return Ok(existing);
        }
        let id = EdgeId::new(self.next_ids.edge);
        self.next_ids.edge += 1;
        self.insert_edge(id, key);
        Ok(id)
    }

    /// Adds the face `(a, b, c)`, or returns the id of the existing face with that key.
    ///
    /// The vertex order of a newly created face is kept as given.
    ///
    /// # Errors
    ///
    /// Returns [`ComplexError::UnknownVertex`] or [`ComplexError::DegenerateSimplex`].
    pub fn add_face(
        &mut self,
        a: VertexId,
        b: VertexId,
        c: VertexId,
    ) -> Result<FaceId, ComplexError> {
        let key = self.checked_face_key([a, b, c])?;
        if let Some(&existing) = self.face_index.get(&key) {
            return Ok(existing);
        }
        let id = FaceId::new(self.next_ids.face);
        self.next_ids.face += 1;
        self.insert_face(Face::new(id, [a, b, c]));
        Ok(id)
    }

    /// Adds a tetrahedron and registers it on its four bounding face keys. Always creates.
    ///
    /// The bounding faces need not exist as face entities.
    ///
    /// # Errors
    ///
    /// Returns [`ComplexError::DimensionMismatch`] in a 2D complex,
    /// [`ComplexError::UnknownVertex`], [`ComplexError::DegenerateSimplex`], or
    /// [`ComplexError::NonManifoldFace`] if a bounding face already has two tetrahedra. Nothing
    /// is registered on failure.
    pub fn add_tetrahedron(
        &mut self,
        a: VertexId,
        b: VertexId,
        c: VertexId,
        d: VertexId,
    ) -> Result<TetId, ComplexError> {
        let vertices = [a, b, c, d];
        self.check_tetrahedron(vertices)?;
        let id = TetId::new(self.next_ids.tetrahedron);
        self.next_ids.tetrahedron += 1;
        self.insert_tetrahedron(Tetrahedron::new(id, vertices));
        Ok(id)
    }

    /// Seed-construction variants of the add operations for inputs that are valid by
    /// construction (fresh, distinct vertices). Deduplication still applies.
    pub(crate) fn seed_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        debug_assert!(self.checked_edge_key(a, b).is_ok());
        let key = EdgeKey::new(a, b);
        if let Some(&existing) = self.edge_index.get(&key) {
            return existing;
        }
        let id = EdgeId::new(self.next_ids.edge);
        self.next_ids.edge += 1;
        self.insert_edge(id, key);
        id
    }

    pub(crate) fn seed_face(&mut self, a: VertexId, b: VertexId, c: VertexId) -> FaceId {
        debug_assert!(self.checked_face_key([a, b, c]).is_ok());
        if let Some(&existing) = self.face_index.get(&FaceKey::new(a, b, c)) {
            return existing;
        }
        let id = FaceId::new(self.next_ids.face);
        self.next_ids.face += 1;
        self.insert_face(Face::new(id, [a, b, c]));
        id
    }

    pub(crate) fn seed_tetrahedron(&mut self, vertices: [VertexId; 4]) -> TetId {
        debug_assert!(self.check_tetrahedron(vertices).is_ok());
        let id = TetId::new(self.next_ids.tetrahedron);
        self.next_ids.tetrahedron += 1;
        self.insert_tetrahedron(Tetrahedron::new(id, vertices));
        id
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    /// Removes a vertex that no simplex references any more.
    ///
    /// Geometry is a separate aggregate; callers owning a
    /// [`Geometry`](crate::geometry::Geometry) remove the position themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ComplexError::UnknownVertex`] or [`ComplexError::VertexInUse`].
    pub fn remove_vertex(&mut self, vertex: VertexId) -> Result<(), ComplexError> {
        if !self.vertices.contains(&vertex) {
            return Err(ComplexError::UnknownVertex { vertex });
        }
        let in_use = if self.edges.values().any(|e| e.contains(vertex)) {
            Some(SimplexKind::Edge)
        } else if self.faces.values().any(|f| f.contains(vertex)) {
            Some(SimplexKind::Face)
        } else if self.tetrahedra.values().any(|t| t.contains(vertex)) {
            Some(SimplexKind::Tetrahedron)
        } else {
            None
        };
        if let Some(kind) = in_use {
            return Err(ComplexError::VertexInUse { vertex, kind });
        }
        self.vertices.remove(&vertex);
        Ok(())
    }

    /// Removes an edge by id, purging its key from the edge index.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        self.edge_index.remove(&edge.key());
        Some(edge)
    }

    /// Removes an edge by canonical key.
    pub fn remove_edge_by_key(&mut self, key: EdgeKey) -> Option<Edge> {
        let id = *self.edge_index.get(&key)?;
        self.remove_edge(id)
    }

    /// Removes a face by id, purging its key from the face index.
    ///
    /// Tetrahedra registered on the face key are unaffected.
    pub fn remove_face(&mut self, id: FaceId) -> Option<Face> {
        let face = self.faces.remove(&id)?;
        self.face_index.remove(&face.key());
        Some(face)
    }

    /// Removes a face by canonical key.
    pub fn remove_face_by_key(&mut self, key: FaceKey) -> Option<Face> {
        let id = *self.face_index.get(&key)?;
        self.remove_face(id)
    }

    /// Removes a tetrahedron, stripping it from the face→tetrahedra index of its four faces.
    /// Index entries left empty are deleted.
    pub fn remove_tetrahedron(&mut self, id: TetId) -> Option<Tetrahedron> {
        let tet = self.tetrahedra.remove(&id)?;
        for key in tet.face_keys() {
            if let Some(list) = self.face_to_tets.get_mut(&key) {
                list.retain(|t| *t != id);
                if list.is_empty() {
                    self.face_to_tets.remove(&key);
                }
            }
        }
        Some(tet)
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Returns `true` if the vertex exists.
    #[must_use]
    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Looks up an edge by id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Looks up a face by id.
    #[must_use]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(&id)
    }

    /// Looks up a tetrahedron by id.
    #[must_use]
    pub fn tetrahedron(&self, id: TetId) -> Option<&Tetrahedron> {
        self.tetrahedra.get(&id)
    }

    /// Id of the edge with the given key.
    #[must_use]
    pub fn edge_id(&self, key: EdgeKey) -> Option<EdgeId> {
        self.edge_index.get(&key).copied()
    }

    /// Id of the edge between `a` and `b`.
    #[must_use]
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_id(EdgeKey::new(a, b))
    }

    /// Id of the face with the given key.
    #[must_use]
    pub fn face_id(&self, key: FaceKey) -> Option<FaceId> {
        self.face_index.get(&key).copied()
    }

    /// Tetrahedra registered on a face key (at most two).
    #[must_use]
    pub fn face_tetrahedra_by_key(&self, key: FaceKey) -> &[TetId] {
        self.face_to_tets.get(&key).map_or(&[], |list| list.as_slice())
    }

    /// Returns the id of an existing tetrahedron spanning exactly these four vertices.
    #[must_use]
    pub fn find_tetrahedron(&self, vertices: [VertexId; 4]) -> Option<TetId> {
        let [a, b, c, d] = vertices;
        self.face_tetrahedra_by_key(FaceKey::new(a, b, c))
            .iter()
            .copied()
            .find(|t| self.tetrahedra.get(t).is_some_and(|tet| tet.contains(d)))
    }

    /// Number of tetrahedra a face key could still accept.
    #[must_use]
    pub fn face_capacity(&self, key: FaceKey) -> usize {
        MAX_TETS_PER_FACE.saturating_sub(self.face_tetrahedra_by_key(key).len())
    }

    // -------------------------------------------------------------------------
    // Iteration and counts
    // -------------------------------------------------------------------------

    /// Vertex ids in creation order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().copied()
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Edge ids in creation order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    /// Faces in creation order.
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.values()
    }

    /// Face ids in creation order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys().copied()
    }

    /// Tetrahedra in creation order.
    pub fn tetrahedra(&self) -> impl Iterator<Item = &Tetrahedron> {
        self.tetrahedra.values()
    }

    /// Tetrahedron ids in creation order.
    pub fn tetrahedron_ids(&self) -> impl Iterator<Item = TetId> + '_ {
        self.tetrahedra.keys().copied()
    }

    /// Face→tetrahedra index entries.
    pub fn face_to_tetrahedra(&self) -> impl Iterator<Item = (FaceKey, &[TetId])> {
        self.face_to_tets.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of tetrahedra.
    #[must_use]
    pub fn number_of_tetrahedra(&self) -> usize {
        self.tetrahedra.len()
    }

    /// Number of top-dimensional simplices: faces in 2D, tetrahedra in 3D.
    #[must_use]
    pub fn number_of_top_simplices(&self) -> usize {
        match self.dimension {
            Dimension::Two => self.number_of_faces(),
            Dimension::Three => self.number_of_tetrahedra(),
        }
    }

    /// Returns `true` if the complex has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Euler characteristic χ = V−E+F (2D) or V−E+F−T (3D).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pachner::core::complex::SimplicialComplex;
    ///
    /// assert_eq!(SimplicialComplex::initial_triangle().euler_characteristic(), 1);
    /// assert_eq!(SimplicialComplex::initial_tetrahedron().euler_characteristic(), 1);
    /// ```
    #[must_use]
    pub fn euler_characteristic(&self) -> isize {
        euler::euler_characteristic(&euler::count_simplices(self))
    }

    // -------------------------------------------------------------------------
    // Half-edges
    // -------------------------------------------------------------------------

    /// The derived half-edge mesh (empty for 3D complexes).
    #[must_use]
    pub const fn half_edges(&self) -> &HalfEdgeMesh {
        &self.half_edges
    }

    /// Rebuilds the half-edge mesh from the face collection.
    pub fn rebuild_half_edges(&mut self) {
        self.half_edges = HalfEdgeMesh::build(self.faces.values());
    }

    /// Refreshes derived structures once a composite 2D mutation is complete.
    pub(crate) fn finish_mutation(&mut self) {
        if self.dimension == Dimension::Two {
            self.rebuild_half_edges();
        }
    }

    // -------------------------------------------------------------------------
    // Checks shared by insertion and deserialization
    // -------------------------------------------------------------------------

    fn require_vertices(&self, vertices: &[VertexId]) -> Result<(), ComplexError> {
        match vertices.iter().find(|v| !self.vertices.contains(v)) {
            Some(&vertex) => Err(ComplexError::UnknownVertex { vertex }),
            None => Ok(()),
        }
    }

    fn checked_edge_key(&self, a: VertexId, b: VertexId) -> Result<EdgeKey, ComplexError> {
        self.require_vertices(&[a, b])?;
        let key = EdgeKey::new(a, b);
        if key.is_degenerate() {
            return Err(ComplexError::DegenerateSimplex {
                kind: SimplexKind::Edge,
                vertices: vec![a, b],
            });
        }
        Ok(key)
    }

    fn checked_face_key(&self, vertices: [VertexId; 3]) -> Result<FaceKey, ComplexError> {
        self.require_vertices(&vertices)?;
        let key = FaceKey::from(vertices);
        if key.is_degenerate() {
            return Err(ComplexError::DegenerateSimplex {
                kind: SimplexKind::Face,
                vertices: vertices.to_vec(),
            });
        }
        Ok(key)
    }

    fn check_tetrahedron(&self, vertices: [VertexId; 4]) -> Result<(), ComplexError> {
        if self.dimension == Dimension::Two {
            return Err(ComplexError::DimensionMismatch {
                dimension: self.dimension,
            });
        }
        self.require_vertices(&vertices)?;
        let mut sorted = vertices;
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(ComplexError::DegenerateSimplex {
                kind: SimplexKind::Tetrahedron,
                vertices: vertices.to_vec(),
            });
        }
        for triple in tetrahedron_face_triples(vertices) {
            let face = FaceKey::from(triple);
            if self.face_capacity(face) == 0 {
                return Err(ComplexError::NonManifoldFace { face });
            }
        }
        Ok(())
    }

    fn insert_edge(&mut self, id: EdgeId, key: EdgeKey) {
        self.edges.insert(id, Edge::new(id, key));
        self.edge_index.insert(key, id);
    }

    fn insert_face(&mut self, face: Face) {
        self.face_index.insert(face.key(), face.id());
        self.faces.insert(face.id(), face);
    }

    fn insert_tetrahedron(&mut self, tet: Tetrahedron) {
        for key in tet.face_keys() {
            self.face_to_tets.entry(key).or_default().push(tet.id());
        }
        self.tetrahedra.insert(tet.id(), tet);
    }
}

// =============================================================================
// SERIALIZATION
// =============================================================================

/// Serialized form of a complex: primary data only.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ComplexData {
    dimension: Dimension,
    vertices: Vec<VertexId>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    tetrahedra: Vec<Tetrahedron>,
    next_ids: IdCounters,
}

impl From<SimplicialComplex> for ComplexData {
    fn from(complex: SimplicialComplex) -> Self {
        Self {
            dimension: complex.dimension,
            vertices: complex.vertices.into_iter().collect(),
            edges: complex.edges.into_values().collect(),
            faces: complex.faces.into_values().collect(),
            tetrahedra: complex.tetrahedra.into_values().collect(),
            next_ids: complex.next_ids,
        }
    }
}

fn check_issued(counters: &IdCounters, kind: SimplexKind, id: u64) -> Result<(), ComplexError> {
    let next = counters.next_for(kind);
    if id < next {
        Ok(())
    } else {
        Err(ComplexError::IdOutOfRange { kind, id, next })
    }
}

impl TryFrom<ComplexData> for SimplicialComplex {
    type Error = ComplexError;

    fn try_from(data: ComplexData) -> Result<Self, Self::Error> {
        let mut complex = Self::new(data.dimension);
        complex.next_ids = data.next_ids;

        for vertex in data.vertices {
            check_issued(&data.next_ids, SimplexKind::Vertex, vertex.get())?;
            if !complex.vertices.insert(vertex) {
                return Err(ComplexError::DuplicateId {
                    kind: SimplexKind::Vertex,
                    id: vertex.get(),
                });
            }
        }

        for edge in data.edges {
            let kind = SimplexKind::Edge;
            check_issued(&data.next_ids, kind, edge.id().get())?;
            let [a, b] = edge.vertices();
            let key = complex.checked_edge_key(a, b)?;
            if complex.edges.contains_key(&edge.id()) {
                return Err(ComplexError::DuplicateId {
                    kind,
                    id: edge.id().get(),
                });
            }
            if complex.edge_index.contains_key(&key) {
                return Err(ComplexError::DuplicateKey {
                    kind,
                    key: key.to_string(),
                });
            }
            complex.insert_edge(edge.id(), key);
        }

        for face in data.faces {
            let kind = SimplexKind::Face;
            check_issued(&data.next_ids, kind, face.id().get())?;
            let key = complex.checked_face_key(face.vertices())?;
            if complex.faces.contains_key(&face.id()) {
                return Err(ComplexError::DuplicateId {
                    kind,
                    id: face.id().get(),
                });
            }
            if complex.face_index.contains_key(&key) {
                return Err(ComplexError::DuplicateKey {
                    kind,
                    key: key.to_string(),
                });
            }
            complex.insert_face(face);
        }

        for tet in data.tetrahedra {
            let kind = SimplexKind::Tetrahedron;
            check_issued(&data.next_ids, kind, tet.id().get())?;
            complex.check_tetrahedron(tet.vertices())?;
            if complex.tetrahedra.contains_key(&tet.id()) {
                return Err(ComplexError::DuplicateId {
                    kind,
                    id: tet.id().get(),
                });
            }
            complex.insert_tetrahedron(tet);
        }

        complex.finish_mutation();
        Ok(complex)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn three_vertices(complex: &mut SimplicialComplex) -> [VertexId; 3] {
        [complex.add_vertex(), complex.add_vertex(), complex.add_vertex()]
    }

    // =========================================================================
    // INSERTION
    // =========================================================================

    #[test]
    fn vertex_ids_are_monotonic_and_never_reused() {
        let mut complex = SimplicialComplex::new(Dimension::Two);
        let a = complex.add_vertex();
        let b = complex.add_vertex();
        assert!(a < b);
        complex.remove_vertex(b).unwrap();
        let c = complex.add_vertex();
        assert!(c > b, "removed ids must not be reissued");
    }

    #[test]
    fn add_edge_deduplicates_by_key() {
        let mut complex = SimplicialComplex::new(Dimension::Two);
        let [a, b, _] = three_vertices(&mut complex);
        let e1 = complex.add_edge(a, b).unwrap();
        let e2 = complex.add_edge(b, a).unwrap();
        assert_eq!(e1, e2);
        assert_eq!(complex.number_of_edges(), 1);
        assert_eq!(complex.edge_between(b, a), Some(e1));
    }

    #[test]
    fn add_face_deduplicates_by_key_and_keeps_order() {
        let mut complex = SimplicialComplex::new(Dimension::Two);
        let [a, b, c] = three_vertices(&mut complex);
        let f1 = complex.add_face(c, a, b).unwrap();
        let f2 = complex.add_face(a, b, c).unwrap();
        assert_eq!(f1, f2);
        assert_eq!(complex.face(f1).unwrap().vertices(), [c, a, b]);
    }

    #[test]
    fn add_rejects_unknown_and_repeated_vertices() {
        let mut complex = SimplicialComplex::new(Dimension::Two);
        let [a, b, _] = three_vertices(&mut complex);
        let ghost = VertexId::new(99);
        assert_eq!(
            complex.add_edge(a, ghost),
            Err(ComplexError::UnknownVertex { vertex: ghost })
        );
        assert!(matches!(
            complex.add_edge(a, a),
            Err(ComplexError::DegenerateSimplex {
                kind: SimplexKind::Edge,
                ..
            })
        ));
        assert!(matches!(
            complex.add_face(a, b, b),
            Err(ComplexError::DegenerateSimplex {
                kind: SimplexKind::Face,
                ..
            })
        ));
        assert_eq!(complex.number_of_edges(), 0);
        assert_eq!(complex.number_of_faces(), 0);
    }

    #[test]
    fn tetrahedra_rejected_in_2d() {
        let mut complex = SimplicialComplex::new(Dimension::Two);
        let [a, b, c] = three_vertices(&mut complex);
        let d = complex.add_vertex();
        assert_eq!(
            complex.add_tetrahedron(a, b, c, d),
            Err(ComplexError::DimensionMismatch {
                dimension: Dimension::Two
            })
        );
    }

    #[test]
    fn tetrahedron_registers_its_four_faces() {
        let complex = SimplicialComplex::initial_tetrahedron();
        let tet = complex.tetrahedra().next().unwrap();
        for key in tet.face_keys() {
            assert_eq!(complex.face_tetrahedra_by_key(key), &[tet.id()]);
        }
        assert_eq!(complex.find_tetrahedron(tet.vertices()), Some(tet.id()));
    }

    #[test]
    fn third_tetrahedron_on_a_face_is_rejected() {
        let mut complex = SimplicialComplex::new(Dimension::Three);
        let [a, b, c] = three_vertices(&mut complex);
        let d = complex.add_vertex();
        let e = complex.add_vertex();
        let f = complex.add_vertex();
        complex.add_tetrahedron(a, b, c, d).unwrap();
        complex.add_tetrahedron(a, b, c, e).unwrap();
        let err = complex.add_tetrahedron(c, b, a, f).unwrap_err();
        assert_eq!(
            err,
            ComplexError::NonManifoldFace {
                face: FaceKey::new(a, b, c)
            }
        );
        assert_eq!(complex.number_of_tetrahedra(), 2);
        // Nothing was registered for the rejected tetrahedron.
        assert!(complex.face_tetrahedra_by_key(FaceKey::new(a, b, f)).is_empty());
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    #[test]
    fn remove_purges_indices() {
        let mut complex = SimplicialComplex::initial_triangle();
        let face = complex.faces().next().unwrap().key();
        let edge = complex.edges().next().unwrap().key();

        assert!(complex.remove_face_by_key(face).is_some());
        assert!(complex.face_id(face).is_none());
        assert!(complex.remove_edge_by_key(edge).is_some());
        assert!(complex.edge_id(edge).is_none());
        assert!(complex.remove_edge_by_key(edge).is_none());

        // Re-adding creates fresh ids.
        let [a, b] = [edge.v0(), edge.v1()];
        let again = complex.add_edge(a, b).unwrap();
        assert_eq!(again.get(), 3);
    }

    #[test]
    fn remove_tetrahedron_cleans_face_index() {
        let mut complex = SimplicialComplex::tetrahedron_strip(2);
        let first = complex.tetrahedron_ids().next().unwrap();
        let keys = complex.tetrahedron(first).unwrap().face_keys();
        let shared: Vec<_> = keys
            .iter()
            .filter(|k| complex.face_tetrahedra_by_key(**k).len() == 2)
            .copied()
            .collect();
        assert_eq!(shared.len(), 1);

        complex.remove_tetrahedron(first).unwrap();
        for key in keys {
            assert!(!complex.face_tetrahedra_by_key(key).contains(&first));
        }
        assert_eq!(complex.face_tetrahedra_by_key(shared[0]).len(), 1);
        let entries = complex.face_to_tetrahedra().count();
        assert_eq!(entries, 4, "empty index entries must be deleted");
    }

    #[test]
    fn referenced_vertex_cannot_be_removed() {
        let mut complex = SimplicialComplex::initial_triangle();
        let v = complex.vertex_ids().next().unwrap();
        assert_eq!(
            complex.remove_vertex(v),
            Err(ComplexError::VertexInUse {
                vertex: v,
                kind: SimplexKind::Edge
            })
        );
        assert!(complex.contains_vertex(v));
    }

    // =========================================================================
    // SERIALIZATION
    // =========================================================================

    #[test]
    fn serde_round_trip_rebuilds_indices() {
        let complex = SimplicialComplex::tetrahedron_strip(3);
        let json = serde_json::to_string(&complex).unwrap();
        let back: SimplicialComplex = serde_json::from_str(&json).unwrap();

        assert_eq!(back.number_of_vertices(), complex.number_of_vertices());
        assert_eq!(back.number_of_edges(), complex.number_of_edges());
        assert_eq!(back.number_of_faces(), complex.number_of_faces());
        assert_eq!(back.number_of_tetrahedra(), complex.number_of_tetrahedra());
        assert_eq!(back.id_counters(), complex.id_counters());
        for face in complex.faces() {
            assert_eq!(back.face_id(face.key()), Some(face.id()));
            assert_eq!(
                back.face_tetrahedra_by_key(face.key()),
                complex.face_tetrahedra_by_key(face.key())
            );
        }
    }

    #[test]
    fn deserialization_rejects_dangling_reference() {
        let json = r#"{
            "dimension": "Two",
            "vertices": [0, 1],
            "edges": [{"id": 0, "key": [0, 2]}],
            "faces": [],
            "tetrahedra": [],
            "next_ids": {"vertex": 3, "edge": 1, "face": 0, "tetrahedron": 0}
        }"#;
        let err = serde_json::from_str::<SimplicialComplex>(json).unwrap_err();
        assert!(err.to_string().contains("v2"), "unexpected error: {err}");
    }

    #[test]
    fn deserialization_rejects_unissued_id() {
        let json = r#"{
            "dimension": "Two",
            "vertices": [0, 5],
            "edges": [],
            "faces": [],
            "tetrahedra": [],
            "next_ids": {"vertex": 2, "edge": 0, "face": 0, "tetrahedron": 0}
        }"#;
        assert!(serde_json::from_str::<SimplicialComplex>(json).is_err());
    }
}
