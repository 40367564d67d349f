//! Derived half-edge structure for 2D complexes.
//!
//! The mesh is rebuilt from scratch out of the face collection after every 2D mutation; it
//! is never maintained incrementally. Half-edge ids are therefore only meaningful until the
//! next rebuild.
//!
//! Each face contributes three half-edges forming a directed cycle over its vertex triple.
//! A half-edge `u → v` is paired with the single half-edge `v → u` of another face, so a twin
//! always starts where its partner ends. Two faces that traverse a shared edge in the same
//! direction are inconsistently oriented and stay unpaired, as do boundary edges and edges
//! of three or more faces.

use crate::core::collections::{FastHashMap, SmallBuffer, fast_hash_map_with_capacity};
use crate::core::simplex::{Face, FaceId, HalfEdgeId, VertexId};

/// A directed edge record of one face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HalfEdge {
    /// Id of this half-edge.
    pub id: HalfEdgeId,
    /// Vertex the half-edge starts at.
    pub origin: VertexId,
    /// Face whose cycle this half-edge belongs to.
    pub face: FaceId,
    /// Next half-edge in the face cycle.
    pub next: HalfEdgeId,
    /// Half-edge of the neighbouring face along the same edge, `None` on the boundary.
    pub twin: Option<HalfEdgeId>,
}

/// Half-edges of a 2D complex plus vertex and face indices for O(1) lookups.
#[derive(Clone, Debug, Default)]
pub struct HalfEdgeMesh {
    half_edges: Vec<HalfEdge>,
    by_vertex: FastHashMap<VertexId, SmallBuffer<HalfEdgeId, 8>>,
    by_face: FastHashMap<FaceId, [HalfEdgeId; 3]>,
}

impl HalfEdgeMesh {
    /// Builds the half-edge mesh of `faces`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pachner::core::complex::SimplicialComplex;
    ///
    /// let complex = SimplicialComplex::triangle_strip(2);
    /// let mesh = complex.half_edges();
    /// assert_eq!(mesh.len(), 6);
    ///
    /// let first = complex.face_ids().next().unwrap();
    /// assert_eq!(mesh.adjacent_faces(first).len(), 1);
    /// ```
    pub fn build<'a>(faces: impl IntoIterator<Item = &'a Face>) -> Self {
        let faces = faces.into_iter();
        let (lower, _) = faces.size_hint();
        let mut half_edges = Vec::with_capacity(lower * 3);
        let mut by_vertex: FastHashMap<VertexId, SmallBuffer<HalfEdgeId, 8>> =
            FastHashMap::default();
        let mut by_face = fast_hash_map_with_capacity(lower);
        let mut by_directed: FastHashMap<(VertexId, VertexId), SmallBuffer<HalfEdgeId, 2>> =
            fast_hash_map_with_capacity(lower * 3);

        for face in faces {
            let base = half_edges.len() as u64;
            let ids = [0, 1, 2].map(|i| HalfEdgeId::new(base + i));
            let vertices = face.vertices();
            for i in 0..3 {
                let origin = vertices[i];
                let dest = vertices[(i + 1) % 3];
                half_edges.push(HalfEdge {
                    id: ids[i],
                    origin,
                    face: face.id(),
                    next: ids[(i + 1) % 3],
                    twin: None,
                });
                by_vertex.entry(origin).or_default().push(ids[i]);
                by_directed.entry((origin, dest)).or_default().push(ids[i]);
            }
            by_face.insert(face.id(), ids);
        }

        for (&(origin, dest), forward) in &by_directed {
            if origin > dest {
                continue;
            }
            let backward = by_directed
                .get(&(dest, origin))
                .map_or(&[][..], |ids| ids.as_slice());
            if let (&[a], &[b]) = (forward.as_slice(), backward) {
                half_edges[index(a)].twin = Some(b);
                half_edges[index(b)].twin = Some(a);
            }
        }

        Self {
            half_edges,
            by_vertex,
            by_face,
        }
    }

    /// Number of half-edges (three per face).
    #[must_use]
    pub fn len(&self) -> usize {
        self.half_edges.len()
    }

    /// Returns `true` if there are no half-edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.half_edges.is_empty()
    }

    /// Looks up a half-edge by id.
    #[must_use]
    pub fn get(&self, id: HalfEdgeId) -> Option<&HalfEdge> {
        usize::try_from(id.get())
            .ok()
            .and_then(|i| self.half_edges.get(i))
    }

    /// Iterates over all half-edges.
    pub fn iter(&self) -> impl Iterator<Item = &HalfEdge> {
        self.half_edges.iter()
    }

    /// Destination vertex of a half-edge (origin of its successor).
    #[must_use]
    pub fn destination(&self, id: HalfEdgeId) -> Option<VertexId> {
        let next = self.get(id)?.next;
        self.get(next).map(|he| he.origin)
    }

    /// Half-edges originating at `vertex`.
    pub fn vertex_half_edges(&self, vertex: VertexId) -> impl Iterator<Item = &HalfEdge> {
        self.by_vertex
            .get(&vertex)
            .into_iter()
            .flatten()
            .filter_map(|&id| self.get(id))
    }

    /// The three half-edges of `face`, in cycle order.
    #[must_use]
    pub fn face_half_edges(&self, face: FaceId) -> Option<[&HalfEdge; 3]> {
        let [a, b, c] = *self.by_face.get(&face)?;
        Some([self.get(a)?, self.get(b)?, self.get(c)?])
    }

    /// Faces sharing an edge with `face`, found through twins.
    #[must_use]
    pub fn adjacent_faces(&self, face: FaceId) -> SmallBuffer<FaceId, 3> {
        let mut result = SmallBuffer::new();
        for he in self.face_half_edges(face).into_iter().flatten() {
            if let Some(twin) = he.twin.and_then(|t| self.get(t))
                && !result.contains(&twin.face)
            {
                result.push(twin.face);
            }
        }
        result
    }

    /// Faces incident to `vertex`. Each incident face has exactly one half-edge leaving it.
    #[must_use]
    pub fn vertex_faces(&self, vertex: VertexId) -> Vec<FaceId> {
        self.vertex_half_edges(vertex).map(|he| he.face).collect()
    }
}

fn index(id: HalfEdgeId) -> usize {
    // Ids are issued from `half_edges.len()`, so they always fit.
    usize::try_from(id.get()).unwrap_or(usize::MAX)
}
