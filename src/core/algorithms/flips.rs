//! Pachner (bistellar) moves on simplicial complexes.
//!
//! A `k`-move replaces `k` top simplices with `d + 2 − k` top simplices covering the same
//! region:
//!
//! | Move | Target | ΔV | ΔE | ΔF | ΔT |
//! |---|---|---|---|---|---|
//! | 1-3 | face | +1 | +3 | +2 | – |
//! | 2-2 | edge | 0 | 0 | 0 | – |
//! | 3-1 | vertex | −1 | −3 | −2 | – |
//! | 1-4 | tetrahedron | +1 | +4 | +6 | +3 |
//! | 2-3 | face | 0 | +1 | +2 | +1 |
//! | 3-2 | edge | 0 | −1 | −2 | −1 |
//! | 4-1 | vertex | −1 | −4 | −6 | −3 |
//!
//! Every row leaves χ unchanged. Moves come in inverse pairs (1-3/3-1, 1-4/4-1, 2-3/3-2) and
//! the 2-2 flip is its own inverse.
//!
//! Each operator checks its preconditions, duplicate and manifold constraints, and geometry
//! before the first mutation. A failed move leaves the complex and geometry untouched.
//!
//! # References
//! - Pachner (1991) - "P.L. homeomorphic manifolds are equivalent by elementary shellings"
//! - Ambjørn, Durhuus & Jonsson (1997) - "Quantum Geometry: A Statistical Field Theory Approach"

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::adjacency::IncidenceCounts;
use crate::core::complex::{ComplexError, SimplicialComplex};
use crate::core::facet::FaceKey;
use crate::core::simplex::{Dimension, EdgeId, FaceId, SimplexKind, TetId, VertexId};
use crate::core::validation::PreconditionError;
use crate::geometry::embedding::{Geometry, GeometryError};

use super::{flips_2d, flips_3d};

/// The seven Pachner moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PachnerMove {
    /// Split a triangle at an interior vertex (2D).
    OneToThree,
    /// Flip the diagonal of two triangles sharing an edge (2D).
    TwoToTwo,
    /// Merge the three triangles around a degree-3 vertex (2D).
    ThreeToOne,
    /// Split a tetrahedron at an interior vertex (3D).
    OneToFour,
    /// Replace two tetrahedra sharing a face by three around an edge (3D).
    TwoToThree,
    /// Replace three tetrahedra around an edge by two sharing a face (3D).
    ThreeToTwo,
    /// Merge the four tetrahedra around a degree-4 vertex (3D).
    FourToOne,
}

impl PachnerMove {
    /// All moves, 2D first.
    pub const ALL: [Self; 7] = [
        Self::OneToThree,
        Self::TwoToTwo,
        Self::ThreeToOne,
        Self::OneToFour,
        Self::TwoToThree,
        Self::ThreeToTwo,
        Self::FourToOne,
    ];

    /// Moves valid in `dimension`.
    #[must_use]
    pub const fn moves_for(dimension: Dimension) -> &'static [Self] {
        match dimension {
            Dimension::Two => &[Self::OneToThree, Self::TwoToTwo, Self::ThreeToOne],
            Dimension::Three => &[
                Self::OneToFour,
                Self::TwoToThree,
                Self::ThreeToTwo,
                Self::FourToOne,
            ],
        }
    }

    /// Dimension the move operates in.
    #[must_use]
    pub const fn dimension(self) -> Dimension {
        match self {
            Self::OneToThree | Self::TwoToTwo | Self::ThreeToOne => Dimension::Two,
            _ => Dimension::Three,
        }
    }

    /// The move undoing this one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pachner::core::algorithms::flips::PachnerMove;
    ///
    /// assert_eq!(PachnerMove::OneToFour.inverse(), PachnerMove::FourToOne);
    /// assert_eq!(PachnerMove::TwoToTwo.inverse(), PachnerMove::TwoToTwo);
    /// ```
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::OneToThree => Self::ThreeToOne,
            Self::ThreeToOne => Self::OneToThree,
            Self::TwoToTwo => Self::TwoToTwo,
            Self::OneToFour => Self::FourToOne,
            Self::FourToOne => Self::OneToFour,
            Self::TwoToThree => Self::ThreeToTwo,
            Self::ThreeToTwo => Self::TwoToThree,
        }
    }

    /// Kind of simplex the move is applied to.
    #[must_use]
    pub const fn target_kind(self) -> SimplexKind {
        match self {
            Self::ThreeToOne | Self::FourToOne => SimplexKind::Vertex,
            Self::TwoToTwo | Self::ThreeToTwo => SimplexKind::Edge,
            Self::OneToThree | Self::TwoToThree => SimplexKind::Face,
            Self::OneToFour => SimplexKind::Tetrahedron,
        }
    }

    /// Exact change of the f-vector, indexed by simplex dimension.
    #[must_use]
    pub const fn simplex_delta(self) -> &'static [isize] {
        match self {
            Self::OneToThree => &[1, 3, 2],
            Self::TwoToTwo => &[0, 0, 0],
            Self::ThreeToOne => &[-1, -3, -2],
            Self::OneToFour => &[1, 4, 6, 3],
            Self::TwoToThree => &[0, 1, 2, 1],
            Self::ThreeToTwo => &[0, -1, -2, -1],
            Self::FourToOne => &[-1, -4, -6, -3],
        }
    }

    /// Returns `true` if the move adds a vertex.
    #[must_use]
    pub const fn creates_vertex(self) -> bool {
        matches!(self, Self::OneToThree | Self::OneToFour)
    }
}

impl fmt::Display for PachnerMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OneToThree => "1-3",
            Self::TwoToTwo => "2-2",
            Self::ThreeToOne => "3-1",
            Self::OneToFour => "1-4",
            Self::TwoToThree => "2-3",
            Self::ThreeToTwo => "3-2",
            Self::FourToOne => "4-1",
        };
        f.write_str(label)
    }
}

/// The simplex a move is applied to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveTarget {
    /// A vertex (3-1, 4-1).
    Vertex(VertexId),
    /// An edge (2-2, 3-2).
    Edge(EdgeId),
    /// A face (1-3, 2-3).
    Face(FaceId),
    /// A tetrahedron (1-4).
    Tetrahedron(TetId),
}

impl MoveTarget {
    /// Kind of the targeted simplex.
    #[must_use]
    pub const fn kind(self) -> SimplexKind {
        match self {
            Self::Vertex(_) => SimplexKind::Vertex,
            Self::Edge(_) => SimplexKind::Edge,
            Self::Face(_) => SimplexKind::Face,
            Self::Tetrahedron(_) => SimplexKind::Tetrahedron,
        }
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex(id) => write!(f, "vertex {id}"),
            Self::Edge(id) => write!(f, "edge {id}"),
            Self::Face(id) => write!(f, "face {id}"),
            Self::Tetrahedron(id) => write!(f, "tetrahedron {id}"),
        }
    }
}

/// Outcome of a successful move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipInfo {
    /// The move applied.
    pub kind: PachnerMove,
    /// Vertex created by 1-3 or 1-4.
    pub new_vertex: Option<VertexId>,
    /// Vertex removed by 3-1 or 4-1.
    pub removed_vertex: Option<VertexId>,
}

/// Errors from Pachner moves. The complex and geometry are unchanged whenever one is returned.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum FlipError {
    /// The target does not satisfy the move's incidence requirement.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    /// A required position is missing.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// The quadrilateral around a 2-2 edge is not strictly convex.
    #[error("Quadrilateral around edge {edge} is not strictly convex")]
    NonConvexQuadrilateral {
        /// Edge that was to be flipped.
        edge: EdgeId,
    },
    /// The move would create a simplex that already exists.
    #[error("Move would duplicate existing {kind} {vertices:?}")]
    DuplicateSimplex {
        /// Kind of the duplicate.
        kind: SimplexKind,
        /// Its vertices.
        vertices: Vec<VertexId>,
    },
    /// The move would give a face a third tetrahedron.
    #[error("Move would give face {face} a third tetrahedron")]
    NonManifoldFace {
        /// The overfull face.
        face: FaceKey,
    },
    /// The store rejected an insertion or removal.
    #[error(transparent)]
    Complex(#[from] ComplexError),
}

/// Applies `kind` to `target`.
///
/// With geometry, 1-3 and 1-4 place the new vertex at the centroid of the split simplex, 2-2
/// refuses non-convex quadrilaterals, and 3-1 and 4-1 drop the removed vertex's position.
/// Without geometry the moves are purely combinatorial.
///
/// # Errors
///
/// Returns [`FlipError`] if a precondition, duplicate check, or geometry lookup fails. Nothing
/// is mutated in that case.
///
/// # Examples
///
/// ```rust
/// use pachner::prelude::*;
///
/// let mut complex = SimplicialComplex::initial_tetrahedron();
/// let tet = complex.tetrahedron_ids().next().unwrap();
/// let info = apply_pachner_move(&mut complex, None, PachnerMove::OneToFour, MoveTarget::Tetrahedron(tet))?;
/// assert_eq!(complex.number_of_tetrahedra(), 4);
///
/// let center = info.new_vertex.unwrap();
/// apply_pachner_move(&mut complex, None, PachnerMove::FourToOne, MoveTarget::Vertex(center))?;
/// assert_eq!(complex.number_of_tetrahedra(), 1);
/// # Ok::<(), FlipError>(())
/// ```
pub fn apply_pachner_move(
    complex: &mut SimplicialComplex,
    geometry: Option<&mut Geometry>,
    kind: PachnerMove,
    target: MoveTarget,
) -> Result<FlipInfo, FlipError> {
    crate::core::validation::validate_pachner_move_preconditions(complex, kind, target)?;
    let info = match (kind, target) {
        (PachnerMove::OneToThree, MoveTarget::Face(face)) => {
            flips_2d::one_to_three(complex, geometry, face)?
        }
        (PachnerMove::TwoToTwo, MoveTarget::Edge(edge)) => {
            flips_2d::two_to_two(complex, geometry, edge)?
        }
        (PachnerMove::ThreeToOne, MoveTarget::Vertex(vertex)) => {
            flips_2d::three_to_one(complex, geometry, vertex)?
        }
        (PachnerMove::OneToFour, MoveTarget::Tetrahedron(tet)) => {
            flips_3d::one_to_four(complex, geometry, tet)?
        }
        (PachnerMove::TwoToThree, MoveTarget::Face(face)) => {
            flips_3d::two_to_three(complex, face)?
        }
        (PachnerMove::ThreeToTwo, MoveTarget::Edge(edge)) => {
            flips_3d::three_to_two(complex, edge)?
        }
        (PachnerMove::FourToOne, MoveTarget::Vertex(vertex)) => {
            flips_3d::four_to_one(complex, geometry, vertex)?
        }
        _ => {
            return Err(PreconditionError::TargetKindMismatch {
                kind,
                expected: kind.target_kind(),
                target,
            }
            .into());
        }
    };
    complex.finish_mutation();
    tracing::debug!(
        move_kind = %kind,
        %target,
        new_vertex = ?info.new_vertex,
        removed_vertex = ?info.removed_vertex,
        "applied Pachner move"
    );
    Ok(info)
}

/// Candidate targets for `kind`, filtered by the move's incidence count in one pass.
///
/// Candidates can still fail the full precondition (outer/ring vertex checks) or the
/// duplicate checks; callers try them in turn.
#[must_use]
pub fn eligible_targets(complex: &SimplicialComplex, kind: PachnerMove) -> Vec<MoveTarget> {
    if kind.dimension() != complex.dimension() {
        return Vec::new();
    }
    match kind {
        PachnerMove::OneToThree => complex.face_ids().map(MoveTarget::Face).collect(),
        PachnerMove::OneToFour => complex
            .tetrahedron_ids()
            .map(MoveTarget::Tetrahedron)
            .collect(),
        PachnerMove::TwoToThree => complex
            .faces()
            .filter(|f| complex.face_tetrahedra_by_key(f.key()).len() == 2)
            .map(|f| MoveTarget::Face(f.id()))
            .collect(),
        PachnerMove::TwoToTwo | PachnerMove::ThreeToOne | PachnerMove::ThreeToTwo | PachnerMove::FourToOne => {
            let counts = IncidenceCounts::compute(complex);
            match kind {
                PachnerMove::TwoToTwo => complex
                    .edges()
                    .filter(|e| counts.faces_at_edge(e.key()) == 2)
                    .map(|e| MoveTarget::Edge(e.id()))
                    .collect(),
                PachnerMove::ThreeToTwo => complex
                    .edges()
                    .filter(|e| counts.tetrahedra_at_edge(e.key()) == 3)
                    .map(|e| MoveTarget::Edge(e.id()))
                    .collect(),
                PachnerMove::ThreeToOne => complex
                    .vertex_ids()
                    .filter(|&v| counts.faces_at_vertex(v) == 3)
                    .map(MoveTarget::Vertex)
                    .collect(),
                _ => complex
                    .vertex_ids()
                    .filter(|&v| counts.tetrahedra_at_vertex(v) == 4)
                    .map(MoveTarget::Vertex)
                    .collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_is_an_involution() {
        for kind in PachnerMove::ALL {
            assert_eq!(kind.inverse().inverse(), kind);
            assert_eq!(kind.inverse().dimension(), kind.dimension());
        }
    }

    #[test]
    fn every_delta_preserves_chi() {
        for kind in PachnerMove::ALL {
            let chi: isize = kind
                .simplex_delta()
                .iter()
                .enumerate()
                .map(|(k, d)| if k % 2 == 0 { *d } else { -d })
                .sum();
            assert_eq!(chi, 0, "{kind} changes χ");
            assert_eq!(kind.simplex_delta().len(), kind.dimension().as_usize() + 1);
        }
    }

    #[test]
    fn moves_for_partition_all() {
        let two = PachnerMove::moves_for(Dimension::Two);
        let three = PachnerMove::moves_for(Dimension::Three);
        assert_eq!(two.len() + three.len(), PachnerMove::ALL.len());
        assert!(two.iter().all(|m| m.dimension() == Dimension::Two));
        assert!(three.iter().all(|m| m.dimension() == Dimension::Three));
    }

    #[test]
    fn display_labels() {
        let labels: Vec<String> = PachnerMove::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["1-3", "2-2", "3-1", "1-4", "2-3", "3-2", "4-1"]);
        assert_eq!(MoveTarget::Face(FaceId::new(4)).to_string(), "face f4");
    }

    #[test]
    fn eligible_targets_on_seeds() {
        let triangle = SimplicialComplex::initial_triangle();
        assert_eq!(eligible_targets(&triangle, PachnerMove::OneToThree).len(), 1);
        assert!(eligible_targets(&triangle, PachnerMove::TwoToTwo).is_empty());
        assert!(eligible_targets(&triangle, PachnerMove::OneToFour).is_empty());

        let strip = SimplicialComplex::tetrahedron_strip(3);
        assert_eq!(eligible_targets(&strip, PachnerMove::TwoToThree).len(), 2);
        assert!(eligible_targets(&strip, PachnerMove::FourToOne).is_empty());
    }

    #[test]
    fn mismatched_target_is_rejected_without_mutation() {
        let mut complex = SimplicialComplex::initial_triangle();
        let before = complex.clone();
        let edge = complex.edge_ids().next().unwrap();
        let result = apply_pachner_move(
            &mut complex,
            None,
            PachnerMove::OneToThree,
            MoveTarget::Edge(edge),
        );
        assert!(matches!(
            result,
            Err(FlipError::Precondition(
                PreconditionError::TargetKindMismatch { .. }
            ))
        ));
        assert_eq!(complex, before);
    }
}
