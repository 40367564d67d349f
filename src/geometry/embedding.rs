//! Vertex embeddings.
//!
//! [`Geometry`] maps vertex ids to positions and is kept entirely separate from the topology:
//! a complex may exist with no geometry at all, and operators take the two aggregates as
//! independent arguments. Positions are `nalgebra` points in 3-space; 2D complexes use the
//! `xy` plane with `z = 0`. The `y` axis points up.
//!
//! The seed constructors here lay out the vertices of the matching topology seeds in
//! [`crate::core::builder`], assuming the seed's vertex ids start at 0.

use crate::core::simplex::VertexId;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Position of a vertex.
pub type Position = Point3<f64>;

/// Normals shorter than this are treated as degenerate.
pub const NORMAL_EPSILON: f64 = 1e-10;

/// Errors raised when geometry is missing or degenerate.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum GeometryError {
    /// The operator needs a position the geometry does not have.
    #[error("Vertex {vertex} has no position")]
    MissingPosition {
        /// Vertex without a position.
        vertex: VertexId,
    },
    /// The operator needs geometry but none was supplied.
    #[error("Operation requires geometry but none was supplied")]
    NoGeometry,
    /// A normal vector is too short to normalize.
    #[error("Degenerate normal: length {length:e} is too short to normalize")]
    DegenerateNormal {
        /// Length of the unnormalized normal.
        length: f64,
    },
}

/// Positions of the vertices of one complex.
///
/// # Examples
///
/// ```rust
/// use pachner::geometry::embedding::Geometry;
/// use pachner::core::simplex::VertexId;
/// use nalgebra::Point3;
///
/// let mut geometry = Geometry::new();
/// let v = VertexId::new(0);
/// geometry.set_position(v, Point3::new(1.0, 2.0, 0.0));
/// assert_eq!(geometry.position(v).unwrap().y, 2.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    positions: BTreeMap<VertexId, Position>,
}

impl Geometry {
    /// Creates an empty geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of `vertex`, if known.
    #[must_use]
    pub fn position(&self, vertex: VertexId) -> Option<&Position> {
        self.positions.get(&vertex)
    }

    /// Position of `vertex`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MissingPosition`] if the vertex has no position.
    pub fn require(&self, vertex: VertexId) -> Result<Position, GeometryError> {
        self.positions
            .get(&vertex)
            .copied()
            .ok_or(GeometryError::MissingPosition { vertex })
    }

    /// Positions of several vertices, failing on the first missing one.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MissingPosition`] for the first vertex without a position.
    pub fn require_all<const N: usize>(
        &self,
        vertices: [VertexId; N],
    ) -> Result<[Position; N], GeometryError> {
        let mut out = [Position::origin(); N];
        for (slot, vertex) in out.iter_mut().zip(vertices) {
            *slot = self.require(vertex)?;
        }
        Ok(out)
    }

    /// Sets or replaces the position of `vertex`.
    pub fn set_position(&mut self, vertex: VertexId, position: Position) {
        self.positions.insert(vertex, position);
    }

    /// Removes the position of `vertex`.
    pub fn remove(&mut self, vertex: VertexId) -> Option<Position> {
        self.positions.remove(&vertex)
    }

    /// Number of positioned vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no vertex has a position.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates over `(vertex, position)` pairs in vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Position)> {
        self.positions.iter().map(|(v, p)| (*v, p))
    }

    /// Centroid of the given vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MissingPosition`] if any vertex has no position.
    pub fn centroid_of<const N: usize>(
        &self,
        vertices: [VertexId; N],
    ) -> Result<Position, GeometryError> {
        Ok(crate::geometry::quality::centroid(&self.require_all(vertices)?))
    }

    /// Axis-aligned bounding box `(min, max)`, or `None` if empty.
    #[must_use]
    pub fn bounds(&self) -> Option<(Position, Position)> {
        let mut iter = self.positions.values();
        let first = *iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        }))
    }

    // -------------------------------------------------------------------------
    // Seeds
    // -------------------------------------------------------------------------

    /// Equilateral triangle for vertices 0, 1, 2 inscribed in a circle of `radius`.
    ///
    /// Vertex 0 is the apex; 1 and 2 form the horizontal base below it.
    #[must_use]
    pub fn triangle(center: Position, radius: f64) -> Self {
        let half_base = radius * 3.0_f64.sqrt() / 2.0;
        let mut geometry = Self::new();
        geometry.set_position(VertexId::new(0), center + Vector3::new(0.0, radius, 0.0));
        geometry.set_position(
            VertexId::new(1),
            center + Vector3::new(-half_base, -radius * 0.5, 0.0),
        );
        geometry.set_position(
            VertexId::new(2),
            center + Vector3::new(half_base, -radius * 0.5, 0.0),
        );
        geometry
    }

    /// Zig-zag strip of `n` equilateral triangles with side `scale`.
    ///
    /// Matches [`SimplicialComplex::triangle_strip`](crate::core::complex::SimplicialComplex::triangle_strip):
    /// vertex 0 is bottom-left, vertex 1 top-left, then new vertices alternate between the
    /// bottom and top rows. The strip is centred on `center`.
    #[must_use]
    pub fn triangle_strip(n: usize, center: Position, scale: f64) -> Self {
        let n = n.max(1);
        let height = scale * 3.0_f64.sqrt() / 2.0;
        let bottom_count = 1 + n.div_ceil(2);
        let top_count = 1 + n / 2;
        let width = (bottom_count.max(top_count) as f64 - 1.0) * scale + scale * 0.5;
        let origin = center + Vector3::new(-width / 2.0, -height / 2.0, 0.0);

        let bottom = |k: usize| origin + Vector3::new(k as f64 * scale, 0.0, 0.0);
        let top = |k: usize| origin + Vector3::new((k as f64 + 0.5) * scale, height, 0.0);

        let mut geometry = Self::new();
        geometry.set_position(VertexId::new(0), bottom(0));
        geometry.set_position(VertexId::new(1), top(0));
        let (mut next_bottom, mut next_top) = (1, 1);
        for i in 0..n {
            let id = VertexId::new(2 + i as u64);
            if i % 2 == 0 {
                geometry.set_position(id, bottom(next_bottom));
                next_bottom += 1;
            } else {
                geometry.set_position(id, top(next_top));
                next_top += 1;
            }
        }
        geometry
    }

    /// Regular tetrahedron for vertices 0..=3: alternating corners of a cube of half-side
    /// `scale / √3`, so every edge has length `scale·√2`.
    #[must_use]
    pub fn tetrahedron(center: Position, scale: f64) -> Self {
        let mut geometry = Self::new();
        for (i, corner) in regular_tetrahedron_corners(scale).into_iter().enumerate() {
            geometry.set_position(VertexId::new(i as u64), center + corner);
        }
        geometry
    }

    /// Chain of `n` tetrahedra matching
    /// [`SimplicialComplex::tetrahedron_strip`](crate::core::complex::SimplicialComplex::tetrahedron_strip).
    ///
    /// Each new vertex is the point reflection, through the centroid of the shared front face,
    /// of the vertex the previous tetrahedron has opposite that face. The chain is then
    /// translated so its vertex mean sits at `center`.
    #[must_use]
    pub fn tetrahedron_strip(n: usize, center: Position, scale: f64) -> Self {
        let n = n.max(1);
        let mut points: Vec<Position> = regular_tetrahedron_corners(scale)
            .into_iter()
            .map(Position::from)
            .collect();
        // Front face and the vertex of the last tetrahedron opposite it.
        let mut front = [1, 2, 3];
        let mut behind = 0;
        for _ in 1..n {
            let face_centroid =
                crate::geometry::quality::centroid(&front.map(|i| points[i]));
            let reflected = face_centroid + (face_centroid - points[behind]);
            points.push(reflected);
            let new_index = points.len() - 1;
            let [a, b, c] = front;
            behind = a;
            front = [b, c, new_index];
        }

        let mean = crate::geometry::quality::centroid(&points);
        let shift = center - mean;
        let mut geometry = Self::new();
        for (i, p) in points.into_iter().enumerate() {
            geometry.set_position(VertexId::new(i as u64), p + shift);
        }
        geometry
    }
}

fn regular_tetrahedron_corners(scale: f64) -> [Vector3<f64>; 4] {
    let s = scale / 3.0_f64.sqrt();
    [
        Vector3::new(s, s, s),
        Vector3::new(s, -s, -s),
        Vector3::new(-s, s, -s),
        Vector3::new(-s, -s, s),
    ]
}
