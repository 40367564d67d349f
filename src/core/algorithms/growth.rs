//! Boundary growth: glue and tent moves.
//!
//! Both moves attach new top simplices to the boundary and add exactly one vertex, so the
//! Euler characteristic is unchanged.
//!
//! - **Glue** attaches one simplex to a boundary element. The apex sits at the element's
//!   centroid (midpoint in 2D) displaced along the outward normal.
//! - **Tent** raises a new vertex above a boundary vertex and cones every non-frozen
//!   boundary element at that vertex to it. The apex sits at the vertex displaced along the
//!   normalized mean of the incident outward normals.
//!
//! Each move computes its full placement and checks every precondition before touching the
//! complex; a rejected move leaves both aggregates unchanged.

use std::fmt;

use nalgebra::Vector3;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::boundary::{
    BoundaryAnalysis, BoundaryElement, BoundaryError, FrozenBoundary, element_vertices,
    outward_normal,
};
use crate::core::collections::{FastHashMap, SmallBuffer};
use crate::core::complex::{ComplexError, SimplicialComplex};
use crate::core::facet::FaceKey;
use crate::core::simplex::{Dimension, VertexId};
use crate::geometry::embedding::{Geometry, GeometryError, NORMAL_EPSILON, Position};
use crate::geometry::predicates::triangles_overlap;
use crate::geometry::quality::{centroid, mean_edge_length};

/// Number of distinct boundary elements a random glue tries before giving up.
pub const MAX_GLUE_ATTEMPTS: usize = 8;

/// Number of distinct boundary vertices a random tent tries before giving up.
pub const MAX_TENT_ATTEMPTS: usize = 8;

/// A 3D candidate overlaps when an existing tetrahedron centroid lies closer to its centroid
/// than this fraction of its mean edge length.
pub const OVERLAP_PROXIMITY_FACTOR: f64 = 0.5;

// =============================================================================
// TYPES
// =============================================================================

/// The two boundary growth moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrowthMove {
    /// Attach one simplex to a boundary element.
    Glue,
    /// Cone the boundary star of a vertex to a new apex.
    Tent,
}

impl GrowthMove {
    /// The other move.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Glue => Self::Tent,
            Self::Tent => Self::Glue,
        }
    }
}

impl fmt::Display for GrowthMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Glue => "glue",
            Self::Tent => "tent",
        })
    }
}

/// How far a glued apex sits from its base element.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GlueMode {
    /// A fixed distance along the outward normal.
    Fixed(f64),
    /// The height of a regular simplex on the element: `len·√3/2` for an edge, and
    /// `a·√(2/3)` for a face with mean edge length `a`.
    Symmetric,
}

impl Default for GlueMode {
    fn default() -> Self {
        Self::Fixed(1.0)
    }
}

/// What a successful growth move did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthInfo {
    /// The move that was applied.
    pub kind: GrowthMove,
    /// The vertex it created.
    pub new_vertex: VertexId,
    /// Number of top simplices it added.
    pub top_simplices_added: usize,
    /// Candidate targets examined, including the one that succeeded.
    pub attempts: usize,
}

/// Errors raised by growth moves. The complex and geometry are unchanged when one is returned.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum GrowthError {
    /// The target vertex does not exist.
    #[error("Vertex {vertex} does not exist")]
    MissingVertex {
        /// Requested vertex.
        vertex: VertexId,
    },
    /// The target element is missing, of the wrong kind, or not on the boundary.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    /// The target element is frozen.
    #[error("{element} is frozen")]
    FrozenTarget {
        /// Requested element.
        element: BoundaryElement,
    },
    /// A tent needs at least two non-frozen boundary elements at its vertex.
    #[error("Vertex {vertex} has {found} usable boundary elements; a tent needs at least 2")]
    InsufficientBoundary {
        /// Requested vertex.
        vertex: VertexId,
        /// Non-frozen boundary elements found at the vertex.
        found: usize,
    },
    /// A position was missing or a normal was degenerate.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// Every candidate examined would overlap existing simplices.
    #[error("Glue rejected: all {attempts} candidates overlap existing simplices")]
    OverlapRejected {
        /// Candidates examined.
        attempts: usize,
    },
    /// There is no non-frozen boundary to grow from.
    #[error("No growable boundary")]
    NoBoundary,
    /// The tent would give the face through `vertex`, `neighbor` and the apex more than two
    /// tetrahedra.
    #[error("Tent over {vertex} would make the face through {neighbor} and the apex non-manifold")]
    NonManifoldTent {
        /// Tent vertex.
        vertex: VertexId,
        /// Boundary neighbor shared by more than two coned faces.
        neighbor: VertexId,
    },
    /// The tent would put the edge from `vertex` to the apex in more than two triangles.
    #[error("Tent over {vertex} would put the edge to the apex in {found} triangles")]
    NonManifoldTentEdge {
        /// Tent vertex.
        vertex: VertexId,
        /// Coned boundary edges at the vertex.
        found: usize,
    },
    /// The entity store rejected a mutation.
    #[error(transparent)]
    Complex(#[from] ComplexError),
}

// =============================================================================
// GLUE
// =============================================================================

/// The element a glue attaches to, shaped by the complex dimension.
#[derive(Copy, Clone, Debug)]
enum GlueBase {
    Edge([VertexId; 2]),
    Face([VertexId; 3]),
}

/// Where a glue will put its apex.
#[derive(Clone, Debug)]
struct GluePlan {
    base: GlueBase,
    corners: SmallBuffer<Position, 3>,
    apex: Position,
}

fn plan_glue(
    complex: &SimplicialComplex,
    geometry: &Geometry,
    element: BoundaryElement,
    mode: GlueMode,
) -> Result<GluePlan, GrowthError> {
    let vertices = element_vertices(complex, element)?;
    let base = match (complex.dimension(), vertices.as_slice()) {
        (Dimension::Two, &[a, b]) => GlueBase::Edge([a, b]),
        (Dimension::Three, &[a, b, c]) => GlueBase::Face([a, b, c]),
        (dimension, _) => {
            return Err(BoundaryError::WrongDimension { element, dimension }.into());
        }
    };
    let normal = outward_normal(complex, geometry, element)?;
    let corners = vertices
        .iter()
        .map(|&v| geometry.require(v))
        .collect::<Result<SmallBuffer<Position, 3>, _>>()?;
    let height = match mode {
        GlueMode::Fixed(distance) => distance,
        GlueMode::Symmetric => {
            let a = mean_edge_length(&corners);
            if corners.len() == 2 {
                a * 3.0_f64.sqrt() / 2.0
            } else {
                a * (2.0_f64 / 3.0).sqrt()
            }
        }
    };
    let apex = centroid(&corners) + normal * height;
    Ok(GluePlan {
        base,
        corners,
        apex,
    })
}

/// Returns `true` if the planned simplex would overlap an existing top simplex.
fn glue_overlaps(complex: &SimplicialComplex, geometry: &Geometry, plan: &GluePlan) -> bool {
    match plan.base {
        GlueBase::Edge(_) => {
            let &[p0, p1] = plan.corners.as_slice() else {
                return false;
            };
            let candidate = [p0, p1, plan.apex];
            complex
                .faces()
                .filter_map(|f| geometry.require_all(f.vertices()).ok())
                .any(|existing| triangles_overlap(&candidate, &existing))
        }
        GlueBase::Face([a, b, c]) => {
            let neighbor = complex
                .face_tetrahedra_by_key(FaceKey::new(a, b, c))
                .first()
                .copied();
            let mut points: SmallBuffer<Position, 4> = plan.corners.iter().copied().collect();
            points.push(plan.apex);
            let candidate = centroid(&points);
            let threshold = OVERLAP_PROXIMITY_FACTOR * mean_edge_length(&points);
            complex
                .tetrahedra()
                .filter(|t| Some(t.id()) != neighbor)
                .filter_map(|t| geometry.require_all(t.vertices()).ok())
                .any(|corners| (centroid(&corners) - candidate).norm() < threshold)
        }
    }
}

fn apply_glue(
    complex: &mut SimplicialComplex,
    geometry: &mut Geometry,
    plan: &GluePlan,
) -> Result<GrowthInfo, GrowthError> {
    let n = complex.add_vertex();
    geometry.set_position(n, plan.apex);
    match plan.base {
        GlueBase::Edge([a, b]) => {
            complex.add_edge(a, n)?;
            complex.add_edge(b, n)?;
            // The new face runs against the existing face along the shared edge.
            let forward = complex.faces().any(|f| f.has_directed_edge(a, b));
            if forward {
                complex.add_face(b, a, n)?;
            } else {
                complex.add_face(a, b, n)?;
            }
        }
        GlueBase::Face([a, b, c]) => {
            for v in [a, b, c] {
                complex.add_edge(v, n)?;
            }
            for (x, y) in [(a, b), (a, c), (b, c)] {
                complex.add_face(x, y, n)?;
            }
            complex.add_tetrahedron(a, b, c, n)?;
        }
    }
    complex.finish_mutation();
    Ok(GrowthInfo {
        kind: GrowthMove::Glue,
        new_vertex: n,
        top_simplices_added: 1,
        attempts: 1,
    })
}

/// Glues a new simplex onto the boundary element `element`.
///
/// No overlap check is made; see [`glue_random_boundary`].
///
/// # Errors
///
/// Returns [`GrowthError::FrozenTarget`] for a frozen element, [`GrowthError::Boundary`] if
/// the element is missing or interior, and [`GrowthError::Geometry`] if a position is missing
/// or the normal is degenerate.
///
/// # Examples
///
/// ```rust
/// use pachner::core::algorithms::growth::{GlueMode, glue};
/// use pachner::core::boundary::{BoundaryAnalysis, FrozenBoundary};
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::geometry::embedding::Geometry;
/// use nalgebra::Point3;
///
/// let mut complex = SimplicialComplex::initial_triangle();
/// let mut geometry = Geometry::triangle(Point3::new(400.0, 300.0, 0.0), 120.0);
/// let edge = complex.boundary_elements()[0];
/// glue(&mut complex, &mut geometry, edge, GlueMode::Symmetric, &FrozenBoundary::none()).unwrap();
/// assert_eq!(complex.number_of_faces(), 2);
/// assert_eq!(complex.euler_characteristic(), 1);
/// ```
pub fn glue(
    complex: &mut SimplicialComplex,
    geometry: &mut Geometry,
    element: BoundaryElement,
    mode: GlueMode,
    frozen: &FrozenBoundary,
) -> Result<GrowthInfo, GrowthError> {
    if frozen.contains(element) {
        return Err(GrowthError::FrozenTarget { element });
    }
    let plan = plan_glue(complex, geometry, element, mode)?;
    apply_glue(complex, geometry, &plan)
}

/// Glues onto a random non-frozen boundary element.
///
/// Candidates are tried in random order, up to [`MAX_GLUE_ATTEMPTS`]. With `prevent_overlap`
/// a candidate whose simplex would overlap the existing complex is skipped.
///
/// # Errors
///
/// Returns [`GrowthError::NoBoundary`] if nothing is growable,
/// [`GrowthError::OverlapRejected`] if any candidate was skipped for overlap and none
/// succeeded, and otherwise the error of the last candidate tried.
pub fn glue_random_boundary<R: Rng + ?Sized>(
    complex: &mut SimplicialComplex,
    geometry: &mut Geometry,
    mode: GlueMode,
    prevent_overlap: bool,
    frozen: &FrozenBoundary,
    rng: &mut R,
) -> Result<GrowthInfo, GrowthError> {
    let mut candidates: Vec<BoundaryElement> = complex
        .boundary_elements()
        .into_iter()
        .filter(|&e| !frozen.contains(e))
        .collect();
    if candidates.is_empty() {
        return Err(GrowthError::NoBoundary);
    }
    candidates.shuffle(rng);

    let mut overlapped = false;
    let mut last_error = GrowthError::NoBoundary;
    for (i, &element) in candidates.iter().take(MAX_GLUE_ATTEMPTS).enumerate() {
        let plan = match plan_glue(complex, geometry, element, mode) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::trace!(%element, error = %err, "glue candidate unusable");
                last_error = err;
                continue;
            }
        };
        if prevent_overlap && glue_overlaps(complex, geometry, &plan) {
            tracing::trace!(%element, "glue candidate overlaps");
            overlapped = true;
            continue;
        }
        let mut info = apply_glue(complex, geometry, &plan)?;
        info.attempts = i + 1;
        return Ok(info);
    }
    if overlapped {
        Err(GrowthError::OverlapRejected {
            attempts: candidates.len().min(MAX_GLUE_ATTEMPTS),
        })
    } else {
        Err(last_error)
    }
}

// =============================================================================
// TENT
// =============================================================================

/// The other corners of each coned element, in stored order with the tent vertex removed.
#[derive(Clone, Debug)]
enum TentRims {
    Edges(Vec<VertexId>),
    Faces(Vec<[VertexId; 2]>),
}

impl TentRims {
    fn len(&self) -> usize {
        match self {
            Self::Edges(rims) => rims.len(),
            Self::Faces(rims) => rims.len(),
        }
    }
}

#[derive(Clone, Debug)]
struct TentPlan {
    vertex: VertexId,
    rims: TentRims,
    apex: Position,
}

fn plan_tent(
    complex: &SimplicialComplex,
    geometry: &Geometry,
    vertex: VertexId,
    scale: f64,
    frozen: &FrozenBoundary,
) -> Result<TentPlan, GrowthError> {
    if !complex.contains_vertex(vertex) {
        return Err(GrowthError::MissingVertex { vertex });
    }
    let elements: Vec<BoundaryElement> = complex
        .boundary_elements_at(vertex)
        .into_iter()
        .filter(|&e| !frozen.contains(e))
        .collect();
    if elements.len() < 2 {
        return Err(GrowthError::InsufficientBoundary {
            vertex,
            found: elements.len(),
        });
    }

    let mut edges = Vec::new();
    let mut faces = Vec::new();
    for &element in &elements {
        let vertices = element_vertices(complex, element)?;
        let others: SmallBuffer<VertexId, 2> =
            vertices.iter().copied().filter(|&v| v != vertex).collect();
        match (complex.dimension(), others.as_slice()) {
            (Dimension::Two, &[u]) => edges.push(u),
            (Dimension::Three, &[a, b]) => faces.push([a, b]),
            (dimension, _) => {
                return Err(BoundaryError::WrongDimension { element, dimension }.into());
            }
        }
    }
    let rims = match complex.dimension() {
        Dimension::Two => {
            // Every coned edge shares the edge (vertex, apex).
            if edges.len() > 2 {
                return Err(GrowthError::NonManifoldTentEdge {
                    vertex,
                    found: edges.len(),
                });
            }
            TentRims::Edges(edges)
        }
        Dimension::Three => {
            // Each face (vertex, x, apex) is shared by every coned face containing x.
            let mut spokes: FastHashMap<VertexId, usize> = FastHashMap::default();
            for &x in faces.iter().flatten() {
                *spokes.entry(x).or_default() += 1;
            }
            if let Some((&neighbor, _)) = spokes.iter().find(|&(_, &count)| count > 2) {
                return Err(GrowthError::NonManifoldTent { vertex, neighbor });
            }
            TentRims::Faces(faces)
        }
    };

    let mut sum = Vector3::zeros();
    let mut usable = 0_usize;
    for &element in &elements {
        match outward_normal(complex, geometry, element) {
            Ok(normal) => {
                sum += normal;
                usable += 1;
            }
            Err(BoundaryError::Geometry(GeometryError::DegenerateNormal { .. })) => {}
            Err(err) => return Err(err.into()),
        }
    }
    if usable == 0 {
        return Err(GeometryError::DegenerateNormal { length: 0.0 }.into());
    }
    let mean = sum / usable as f64;
    let length = mean.norm();
    if length < NORMAL_EPSILON {
        return Err(GeometryError::DegenerateNormal { length }.into());
    }
    let apex = geometry.require(vertex)? + mean / length * scale;

    Ok(TentPlan { vertex, rims, apex })
}

fn apply_tent(
    complex: &mut SimplicialComplex,
    geometry: &mut Geometry,
    plan: &TentPlan,
) -> Result<GrowthInfo, GrowthError> {
    let v = plan.vertex;
    let n = complex.add_vertex();
    geometry.set_position(n, plan.apex);
    complex.add_edge(v, n)?;
    match &plan.rims {
        TentRims::Edges(rims) => {
            for &u in rims {
                complex.add_edge(u, n)?;
                let forward = complex.faces().any(|f| f.has_directed_edge(v, u));
                if forward {
                    complex.add_face(u, v, n)?;
                } else {
                    complex.add_face(v, u, n)?;
                }
            }
        }
        TentRims::Faces(rims) => {
            for &[a, b] in rims {
                complex.add_edge(a, n)?;
                complex.add_edge(b, n)?;
                complex.add_face(v, a, n)?;
                complex.add_face(v, b, n)?;
                complex.add_face(a, b, n)?;
                complex.add_tetrahedron(v, a, b, n)?;
            }
        }
    }
    complex.finish_mutation();
    Ok(GrowthInfo {
        kind: GrowthMove::Tent,
        new_vertex: n,
        top_simplices_added: plan.rims.len(),
        attempts: 1,
    })
}

/// Raises a tent over `vertex`: a new apex at distance `scale` along the mean outward normal,
/// coned to every non-frozen boundary element at `vertex`.
///
/// Elements whose normal is degenerate are left out of the mean but still coned.
///
/// # Errors
///
/// Returns [`GrowthError::InsufficientBoundary`] if fewer than two non-frozen boundary
/// elements meet at `vertex`, [`GrowthError::Geometry`] if the mean normal is degenerate or a
/// position is missing, [`GrowthError::NonManifoldTentEdge`] if more than two boundary edges
/// meet at a 2D `vertex`, and [`GrowthError::NonManifoldTent`] if a new face would be shared by
/// more than two tetrahedra.
///
/// # Examples
///
/// ```rust
/// use pachner::core::algorithms::growth::tent;
/// use pachner::core::boundary::FrozenBoundary;
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::core::simplex::VertexId;
/// use pachner::geometry::embedding::Geometry;
/// use nalgebra::Point3;
///
/// let mut complex = SimplicialComplex::initial_tetrahedron();
/// let mut geometry = Geometry::tetrahedron(Point3::new(400.0, 300.0, 0.0), 80.0);
/// let info = tent(&mut complex, &mut geometry, VertexId::new(0), 40.0, &FrozenBoundary::none())
///     .unwrap();
/// assert_eq!(info.top_simplices_added, 3);
/// assert_eq!(complex.number_of_tetrahedra(), 4);
/// assert_eq!(complex.euler_characteristic(), 1);
/// ```
pub fn tent(
    complex: &mut SimplicialComplex,
    geometry: &mut Geometry,
    vertex: VertexId,
    scale: f64,
    frozen: &FrozenBoundary,
) -> Result<GrowthInfo, GrowthError> {
    let plan = plan_tent(complex, geometry, vertex, scale, frozen)?;
    apply_tent(complex, geometry, &plan)
}

/// Raises a tent over a random boundary vertex.
///
/// Vertices of non-frozen boundary elements are tried in random order, up to
/// [`MAX_TENT_ATTEMPTS`].
///
/// # Errors
///
/// Returns [`GrowthError::NoBoundary`] if nothing is growable, and otherwise the error of the
/// last vertex tried.
pub fn tent_random_vertex<R: Rng + ?Sized>(
    complex: &mut SimplicialComplex,
    geometry: &mut Geometry,
    scale: f64,
    frozen: &FrozenBoundary,
    rng: &mut R,
) -> Result<GrowthInfo, GrowthError> {
    let mut candidates: Vec<VertexId> = complex
        .boundary_elements()
        .into_iter()
        .filter(|&e| !frozen.contains(e))
        .filter_map(|e| element_vertices(complex, e).ok())
        .flatten()
        .collect();
    candidates.sort_unstable();
    candidates.dedup();
    if candidates.is_empty() {
        return Err(GrowthError::NoBoundary);
    }
    candidates.shuffle(rng);

    let mut last_error = GrowthError::NoBoundary;
    for (i, &vertex) in candidates.iter().take(MAX_TENT_ATTEMPTS).enumerate() {
        match plan_tent(complex, geometry, vertex, scale, frozen) {
            Ok(plan) => {
                let mut info = apply_tent(complex, geometry, &plan)?;
                info.attempts = i + 1;
                return Ok(info);
            }
            Err(err) => {
                tracing::trace!(%vertex, error = %err, "tent candidate unusable");
                last_error = err;
            }
        }
    }
    Err(last_error)
}
