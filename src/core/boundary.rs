//! Boundary detection, outward normals and frozen boundary constraints.
//!
//! A boundary element is a codimension-one simplex with exactly one incident top simplex:
//! an edge in one face (2D) or a face in one tetrahedron (3D). Membership is derived from
//! incidences every time it is asked for; nothing is cached on the complex.
//!
//! # Outward normals
//!
//! The outward normal of a boundary element points away from the interior (the vertex of the
//! incident top simplex opposite the element):
//!
//! - 2D edge `(p0, p1)`: `(dy, -dx, 0)`, flipped if it points toward the interior vertex.
//! - 3D face `(p0, p1, p2)`: `(p1 - p0) × (p2 - p0)`, flipped the same way.
//!
//! Normals are unit length. A raw normal shorter than
//! [`NORMAL_EPSILON`](crate::geometry::embedding::NORMAL_EPSILON) is reported as
//! [`GeometryError::DegenerateNormal`].

use std::collections::BTreeSet;
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::collections::{FastHashMap, SmallBuffer};
use crate::core::complex::SimplicialComplex;
use crate::core::edge::EdgeKey;
use crate::core::simplex::{Dimension, EdgeId, FaceId, VertexId};
use crate::geometry::embedding::{Geometry, GeometryError, NORMAL_EPSILON, Position};

/// Relative tolerance (fraction of the bounding-box extent) for frozen boundary detection.
pub const FROZEN_TOLERANCE_FACTOR: f64 = 1e-6;

/// A codimension-one simplex that may lie on the boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoundaryElement {
    /// An edge of a 2D complex.
    Edge(EdgeId),
    /// A face of a 3D complex.
    Face(FaceId),
}

impl fmt::Display for BoundaryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edge(id) => write!(f, "edge {id}"),
            Self::Face(id) => write!(f, "face {id}"),
        }
    }
}

/// Errors raised by boundary queries.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum BoundaryError {
    /// The element does not exist in the complex.
    #[error("Boundary element {element} does not exist")]
    MissingElement {
        /// Requested element.
        element: BoundaryElement,
    },
    /// The element is not of the complex's boundary kind.
    #[error("{element} cannot be a boundary element of a {dimension} complex")]
    WrongDimension {
        /// Requested element.
        element: BoundaryElement,
        /// Dimension of the complex.
        dimension: Dimension,
    },
    /// The element has other than one incident top simplex.
    #[error("{element} is not on the boundary: {incident} incident top simplices")]
    NotBoundary {
        /// Requested element.
        element: BoundaryElement,
        /// Number of incident top simplices.
        incident: usize,
    },
    /// A position was missing or a normal was degenerate.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Boundary queries on a complex.
///
/// Implemented for [`SimplicialComplex`]; the element kind follows the complex's dimension.
pub trait BoundaryAnalysis {
    /// All boundary elements, in id order.
    fn boundary_elements(&self) -> Vec<BoundaryElement>;

    /// Boundary elements having `vertex` as a corner, in id order.
    fn boundary_elements_at(&self, vertex: VertexId) -> Vec<BoundaryElement>;

    /// Number of top simplices incident to `element`.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::MissingElement`] or [`BoundaryError::WrongDimension`].
    fn incident_top_simplices(&self, element: BoundaryElement) -> Result<usize, BoundaryError>;

    /// Returns `true` if `element` exists and has exactly one incident top simplex.
    fn is_boundary(&self, element: BoundaryElement) -> bool {
        matches!(self.incident_top_simplices(element), Ok(1))
    }

    /// Number of boundary elements.
    fn number_of_boundary_elements(&self) -> usize {
        self.boundary_elements().len()
    }
}

impl BoundaryAnalysis for SimplicialComplex {
    fn boundary_elements(&self) -> Vec<BoundaryElement> {
        match self.dimension() {
            Dimension::Two => {
                let mut counts: FastHashMap<EdgeKey, usize> = FastHashMap::default();
                for face in self.faces() {
                    for key in face.edge_keys() {
                        *counts.entry(key).or_default() += 1;
                    }
                }
                self.edges()
                    .filter(|e| counts.get(&e.key()) == Some(&1))
                    .map(|e| BoundaryElement::Edge(e.id()))
                    .collect()
            }
            Dimension::Three => self
                .faces()
                .filter(|f| self.face_tetrahedra_by_key(f.key()).len() == 1)
                .map(|f| BoundaryElement::Face(f.id()))
                .collect(),
        }
    }

    fn boundary_elements_at(&self, vertex: VertexId) -> Vec<BoundaryElement> {
        match self.dimension() {
            Dimension::Two => self
                .edges()
                .filter(|e| e.contains(vertex) && self.edge_faces(e.key()).len() == 1)
                .map(|e| BoundaryElement::Edge(e.id()))
                .collect(),
            Dimension::Three => self
                .faces()
                .filter(|f| f.contains(vertex) && self.face_tetrahedra_by_key(f.key()).len() == 1)
                .map(|f| BoundaryElement::Face(f.id()))
                .collect(),
        }
    }

    fn incident_top_simplices(&self, element: BoundaryElement) -> Result<usize, BoundaryError> {
        match (self.dimension(), element) {
            (Dimension::Two, BoundaryElement::Edge(id)) => {
                let edge = self
                    .edge(id)
                    .ok_or(BoundaryError::MissingElement { element })?;
                Ok(self.edge_faces(edge.key()).len())
            }
            (Dimension::Three, BoundaryElement::Face(id)) => {
                let face = self
                    .face(id)
                    .ok_or(BoundaryError::MissingElement { element })?;
                Ok(self.face_tetrahedra_by_key(face.key()).len())
            }
            (dimension, _) => Err(BoundaryError::WrongDimension { element, dimension }),
        }
    }
}

/// Vertices of a boundary element, in stored order.
///
/// # Errors
///
/// Returns [`BoundaryError::MissingElement`] if the element does not exist.
pub fn element_vertices(
    complex: &SimplicialComplex,
    element: BoundaryElement,
) -> Result<SmallBuffer<VertexId, 3>, BoundaryError> {
    match element {
        BoundaryElement::Edge(id) => complex
            .edge(id)
            .map(|e| e.vertices().into_iter().collect()),
        BoundaryElement::Face(id) => complex
            .face(id)
            .map(|f| f.vertices().into_iter().collect()),
    }
    .ok_or(BoundaryError::MissingElement { element })
}

/// The vertex of the unique incident top simplex that is not on `element`.
///
/// # Errors
///
/// Returns an error if the element is missing, of the wrong kind, or not on the boundary.
pub fn interior_vertex(
    complex: &SimplicialComplex,
    element: BoundaryElement,
) -> Result<VertexId, BoundaryError> {
    let incident = complex.incident_top_simplices(element)?;
    if incident != 1 {
        return Err(BoundaryError::NotBoundary { element, incident });
    }
    let missing = BoundaryError::MissingElement { element };
    match element {
        BoundaryElement::Edge(id) => {
            let key = complex.edge(id).ok_or(missing.clone())?.key();
            complex
                .edge_faces(key)
                .first()
                .and_then(|&f| complex.face(f))
                .and_then(|f| f.opposite_vertex(key))
                .ok_or(missing)
        }
        BoundaryElement::Face(id) => {
            let key = complex.face(id).ok_or(missing.clone())?.key();
            complex
                .face_tetrahedra_by_key(key)
                .first()
                .and_then(|&t| complex.tetrahedron(t))
                .and_then(|t| t.opposite_vertex(key))
                .ok_or(missing)
        }
    }
}

/// Unit normal of the edge `p0p1` in the `xy` plane, pointing away from `interior`.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateNormal`] if the edge has (near) zero length.
pub fn edge_normal_2d(
    p0: &Position,
    p1: &Position,
    interior: &Position,
) -> Result<Vector3<f64>, GeometryError> {
    let d = p1 - p0;
    let normal = Vector3::new(d.y, -d.x, 0.0);
    let midpoint = p0 + d * 0.5;
    orient_and_normalize(normal, interior - midpoint)
}

/// Unit normal of the triangle `p0p1p2`, pointing away from `interior`.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateNormal`] if the triangle is (near) degenerate.
pub fn face_normal_3d(
    p0: &Position,
    p1: &Position,
    p2: &Position,
    interior: &Position,
) -> Result<Vector3<f64>, GeometryError> {
    let normal = (p1 - p0).cross(&(p2 - p0));
    let centroid = crate::geometry::quality::centroid(&[*p0, *p1, *p2]);
    orient_and_normalize(normal, interior - centroid)
}

fn orient_and_normalize(
    normal: Vector3<f64>,
    toward_interior: Vector3<f64>,
) -> Result<Vector3<f64>, GeometryError> {
    let normal = if normal.dot(&toward_interior) > 0.0 {
        -normal
    } else {
        normal
    };
    let length = normal.norm();
    if length < NORMAL_EPSILON {
        return Err(GeometryError::DegenerateNormal { length });
    }
    Ok(normal / length)
}

/// Outward unit normal of a boundary element.
///
/// # Errors
///
/// Returns an error if the element is not on the boundary, a position is missing, or the
/// normal is degenerate.
///
/// # Examples
///
/// ```rust
/// use pachner::core::boundary::{BoundaryAnalysis, outward_normal};
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::geometry::embedding::Geometry;
/// use nalgebra::Point3;
///
/// let complex = SimplicialComplex::initial_triangle();
/// let geometry = Geometry::triangle(Point3::origin(), 1.0);
/// for element in complex.boundary_elements() {
///     let normal = outward_normal(&complex, &geometry, element).unwrap();
///     assert!((normal.norm() - 1.0).abs() < 1e-12);
/// }
/// ```
pub fn outward_normal(
    complex: &SimplicialComplex,
    geometry: &Geometry,
    element: BoundaryElement,
) -> Result<Vector3<f64>, BoundaryError> {
    let interior = geometry.require(interior_vertex(complex, element)?)?;
    let vertices = element_vertices(complex, element)?;
    let normal = match vertices.as_slice() {
        &[a, b] => {
            let [p0, p1] = geometry.require_all([a, b])?;
            edge_normal_2d(&p0, &p1, &interior)?
        }
        &[a, b, c] => {
            let [p0, p1, p2] = geometry.require_all([a, b, c])?;
            face_normal_3d(&p0, &p1, &p2, &interior)?
        }
        _ => return Err(BoundaryError::MissingElement { element }),
    };
    Ok(normal)
}

/// Which boundary elements are protected from growth.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryConstraint {
    /// Nothing is frozen.
    #[default]
    None,
    /// Elements lying entirely on the bottom (`y` minimum) or on a side of the bounding box
    /// (`x` extremes, plus `z` extremes in 3D). `y` points up.
    BottomAndSides,
    /// An explicit list of elements.
    Custom(Vec<BoundaryElement>),
}

/// The set of frozen boundary elements, computed once from a [`BoundaryConstraint`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenBoundary {
    elements: BTreeSet<BoundaryElement>,
}

impl FrozenBoundary {
    /// An empty set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolves `constraint` against the current boundary and geometry.
    ///
    /// [`BoundaryConstraint::Custom`] elements are taken as given.
    #[must_use]
    pub fn compute(
        constraint: &BoundaryConstraint,
        complex: &SimplicialComplex,
        geometry: &Geometry,
    ) -> Self {
        let elements = match constraint {
            BoundaryConstraint::None => BTreeSet::new(),
            BoundaryConstraint::Custom(list) => list.iter().copied().collect(),
            BoundaryConstraint::BottomAndSides => {
                bottom_and_sides(complex, geometry).unwrap_or_default()
            }
        };
        if !elements.is_empty() {
            tracing::debug!(frozen = elements.len(), ?constraint, "computed frozen boundary");
        }
        Self { elements }
    }

    /// Returns `true` if `element` is frozen.
    #[must_use]
    pub fn contains(&self, element: BoundaryElement) -> bool {
        self.elements.contains(&element)
    }

    /// Number of frozen elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if nothing is frozen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over frozen elements in order.
    pub fn iter(&self) -> impl Iterator<Item = BoundaryElement> + '_ {
        self.elements.iter().copied()
    }
}

impl FromIterator<BoundaryElement> for FrozenBoundary {
    fn from_iter<I: IntoIterator<Item = BoundaryElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

fn bottom_and_sides(
    complex: &SimplicialComplex,
    geometry: &Geometry,
) -> Option<BTreeSet<BoundaryElement>> {
    let (lo, hi) = geometry.bounds()?;
    let extent = (hi - lo).amax();
    let tolerance = FROZEN_TOLERANCE_FACTOR * if extent > 0.0 { extent } else { 1.0 };
    let near = |value: f64, target: f64| (value - target).abs() <= tolerance;

    let mut planes: Vec<(usize, f64)> = vec![(1, lo.y), (0, lo.x), (0, hi.x)];
    if complex.dimension() == Dimension::Three {
        planes.extend([(2, lo.z), (2, hi.z)]);
    }

    let mut frozen = BTreeSet::new();
    for element in complex.boundary_elements() {
        let Ok(vertices) = element_vertices(complex, element) else {
            continue;
        };
        let positions: Option<Vec<Position>> = vertices
            .iter()
            .map(|&v| geometry.position(v).copied())
            .collect();
        let Some(positions) = positions else {
            continue;
        };
        let on_plane = planes
            .iter()
            .any(|&(axis, target)| positions.iter().all(|p| near(p[axis], target)));
        if on_plane {
            frozen.insert(element);
        }
    }
    Some(frozen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn triangle_boundary_is_every_edge() {
        let complex = SimplicialComplex::initial_triangle();
        assert_eq!(complex.number_of_boundary_elements(), 3);
        for element in complex.boundary_elements() {
            assert!(complex.is_boundary(element));
        }
    }

    #[test]
    fn strip_interior_edges_are_not_boundary() {
        let complex = SimplicialComplex::triangle_strip(4);
        // 2n+1 edges, n-1 of them shared.
        assert_eq!(complex.number_of_boundary_elements(), 6);
        let interior = complex
            .edges()
            .filter(|e| complex.edge_faces(e.key()).len() == 2)
            .count();
        assert_eq!(interior, 3);
    }

    #[test]
    fn tetrahedron_strip_boundary_faces() {
        let complex = SimplicialComplex::tetrahedron_strip(3);
        // 3n+1 faces, n-1 shared.
        assert_eq!(complex.number_of_boundary_elements(), 8);
        let v = complex.vertex_ids().next().unwrap();
        assert_eq!(complex.boundary_elements_at(v).len(), 3);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let complex = SimplicialComplex::initial_triangle();
        let element = BoundaryElement::Face(FaceId::new(0));
        assert_eq!(
            complex.incident_top_simplices(element),
            Err(BoundaryError::WrongDimension {
                element,
                dimension: Dimension::Two
            })
        );
        assert!(!complex.is_boundary(BoundaryElement::Edge(EdgeId::new(99))));
    }

    #[test]
    fn edge_normal_points_away_from_interior() {
        let p0 = Position::new(0.0, 0.0, 0.0);
        let p1 = Position::new(2.0, 0.0, 0.0);
        let above = Position::new(1.0, 1.0, 0.0);
        let below = Position::new(1.0, -1.0, 0.0);
        let n = edge_normal_2d(&p0, &p1, &above).unwrap();
        assert_relative_eq!(n, Vector3::new(0.0, -1.0, 0.0));
        let n = edge_normal_2d(&p0, &p1, &below).unwrap();
        assert_relative_eq!(n, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn face_normal_points_away_from_interior() {
        let p0 = Position::new(0.0, 0.0, 0.0);
        let p1 = Position::new(1.0, 0.0, 0.0);
        let p2 = Position::new(0.0, 1.0, 0.0);
        let n = face_normal_3d(&p0, &p1, &p2, &Position::new(0.2, 0.2, 1.0)).unwrap();
        assert_relative_eq!(n, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn degenerate_edge_has_no_normal() {
        let p = Position::new(1.0, 1.0, 0.0);
        assert!(matches!(
            edge_normal_2d(&p, &p, &Position::origin()),
            Err(GeometryError::DegenerateNormal { .. })
        ));
    }

    #[test]
    fn outward_normals_of_seed_tetrahedron() {
        let complex = SimplicialComplex::initial_tetrahedron();
        let geometry = Geometry::tetrahedron(Position::origin(), 1.0);
        for element in complex.boundary_elements() {
            let normal = outward_normal(&complex, &geometry, element).unwrap();
            let vertices = element_vertices(&complex, element).unwrap();
            let [a, b, c] = [vertices[0], vertices[1], vertices[2]];
            let centroid = geometry.centroid_of([a, b, c]).unwrap();
            // The seed is centred on the origin, so outward means away from it.
            assert!(normal.dot(&centroid.coords) > 0.0);
        }
    }

    #[test]
    fn bottom_and_sides_freezes_triangle_base() {
        let complex = SimplicialComplex::initial_triangle();
        let geometry = Geometry::triangle(Position::new(400.0, 300.0, 0.0), 120.0);
        let frozen = FrozenBoundary::compute(&BoundaryConstraint::BottomAndSides, &complex, &geometry);
        assert_eq!(frozen.len(), 1);
        let base = complex
            .edge_between(VertexId::new(1), VertexId::new(2))
            .unwrap();
        assert!(frozen.contains(BoundaryElement::Edge(base)));
    }

    #[test]
    fn custom_and_none_constraints() {
        let complex = SimplicialComplex::initial_triangle();
        let geometry = Geometry::triangle(Position::origin(), 1.0);
        assert!(FrozenBoundary::compute(&BoundaryConstraint::None, &complex, &geometry).is_empty());
        let element = BoundaryElement::Edge(EdgeId::new(0));
        let frozen = FrozenBoundary::compute(
            &BoundaryConstraint::Custom(vec![element]),
            &complex,
            &geometry,
        );
        assert!(frozen.contains(element));
        assert_eq!(frozen.iter().count(), 1);
    }
}
