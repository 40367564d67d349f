//! Structural validation and Pachner-move preconditions.
//!
//! [`validate_simplicial_complex`] is a full advisory scan. It is not run on every mutation;
//! tests and diagnostics call it explicitly. A non-empty error list signals a bug in an
//! operator, never an expected runtime condition.
//!
//! [`validate_pachner_move_preconditions`] checks one move's incidence requirement:
//!
//! | Move | Target | Requirement |
//! |---|---|---|
//! | 1-3 | face | exists |
//! | 2-2 | edge | exactly 2 incident faces |
//! | 3-1 | vertex | exactly 3 faces, 3 edges, 3 distinct outer vertices |
//! | 1-4 | tetrahedron | exists |
//! | 2-3 | face | exactly 2 incident tetrahedra |
//! | 3-2 | edge | exactly 3 tetrahedra, 3 faces, 3 distinct ring vertices |
//! | 4-1 | vertex | exactly 4 tetrahedra, 6 faces, 4 edges, 4 distinct outer vertices |
//!
//! The edge and face counts on 3-1, 3-2 and 4-1 guarantee that removing the star leaves no
//! dangling sub-simplex.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::algorithms::flips::{MoveTarget, PachnerMove};
use crate::core::collections::FastHashMap;
use crate::core::complex::SimplicialComplex;
use crate::core::edge::EdgeKey;
use crate::core::facet::FaceKey;
use crate::core::simplex::{Dimension, FaceId, SimplexKind, TetId, VertexId};

// =============================================================================
// STRUCTURAL VALIDATION
// =============================================================================

/// A structural defect found by [`validate_simplicial_complex`].
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StructuralError {
    /// A simplex references a vertex that does not exist.
    #[error("{kind} {id} references missing vertex {vertex}")]
    DanglingVertex {
        /// Kind of the referencing simplex.
        kind: SimplexKind,
        /// Raw id of the referencing simplex.
        id: u64,
        /// The missing vertex.
        vertex: VertexId,
    },
    /// A simplex repeats a vertex.
    #[error("{kind} {id} is degenerate: {vertices:?}")]
    DegenerateSimplex {
        /// Kind of the simplex.
        kind: SimplexKind,
        /// Raw id.
        id: u64,
        /// Its vertices.
        vertices: Vec<VertexId>,
    },
    /// More than two tetrahedra share a face.
    #[error("Face {face} is shared by {count} tetrahedra: {tetrahedra:?}")]
    NonManifoldFace {
        /// The face key.
        face: FaceKey,
        /// Number of incident tetrahedra.
        count: usize,
        /// The tetrahedra.
        tetrahedra: Vec<TetId>,
    },
    /// A tetrahedron is missing from the face index of one of its faces.
    #[error("Tetrahedron {tet} is not indexed under face {face}")]
    UnindexedTetrahedron {
        /// The tetrahedron.
        tet: TetId,
        /// The face key.
        face: FaceKey,
    },
    /// The face index lists a tetrahedron that does not exist or lacks that face.
    #[error("Face index entry {face} lists stale tetrahedron {tet}")]
    StaleIndexEntry {
        /// The face key.
        face: FaceKey,
        /// The listed tetrahedron.
        tet: TetId,
    },
    /// A canonical-key index disagrees with the entity collection.
    #[error("{kind} index mismatch for key {key}")]
    IndexMismatch {
        /// Kind of the indexed entity.
        kind: SimplexKind,
        /// The key, formatted.
        key: String,
    },
    /// A 2D complex holds tetrahedra.
    #[error("2D complex holds {count} tetrahedra")]
    TetrahedraInPlanarComplex {
        /// Number of tetrahedra.
        count: usize,
    },
}

/// A non-fatal finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ValidationWarning {
    /// Several faces share one canonical key.
    DuplicateFace {
        /// The key.
        key: FaceKey,
        /// The faces.
        faces: Vec<FaceId>,
    },
    /// A side of a face or tetrahedron is not registered as an entity.
    MissingSubSimplex {
        /// Kind of the missing side.
        kind: SimplexKind,
        /// Its vertices.
        vertices: Vec<VertexId>,
    },
    /// A vertex belongs to no edge.
    IsolatedVertex {
        /// The vertex.
        vertex: VertexId,
    },
}

/// Errors and warnings from a structural scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Structural errors.
    pub errors: Vec<StructuralError>,
    /// Warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Returns `true` if no structural error was found. Warnings do not count.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Scans the whole complex for structural defects.
///
/// # Examples
///
/// ```rust
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::core::validation::validate_simplicial_complex;
///
/// let report = validate_simplicial_complex(&SimplicialComplex::tetrahedron_strip(4));
/// assert!(report.is_valid());
/// assert!(report.warnings.is_empty());
/// ```
#[must_use]
pub fn validate_simplicial_complex(complex: &SimplicialComplex) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_edges(complex, &mut report);
    check_faces(complex, &mut report);
    check_tetrahedra(complex, &mut report);

    let mut connected: BTreeSet<VertexId> = BTreeSet::new();
    for edge in complex.edges() {
        connected.extend(edge.vertices());
    }
    report.warnings.extend(
        complex
            .vertex_ids()
            .filter(|v| !connected.contains(v))
            .map(|vertex| ValidationWarning::IsolatedVertex { vertex }),
    );

    if !report.is_valid() {
        tracing::warn!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "structural validation failed"
        );
    }
    report
}

fn check_vertices(
    complex: &SimplicialComplex,
    kind: SimplexKind,
    id: u64,
    vertices: &[VertexId],
    report: &mut ValidationReport,
) -> bool {
    let mut ok = true;
    for &vertex in vertices {
        if !complex.contains_vertex(vertex) {
            report
                .errors
                .push(StructuralError::DanglingVertex { kind, id, vertex });
            ok = false;
        }
    }
    let distinct: BTreeSet<VertexId> = vertices.iter().copied().collect();
    if distinct.len() != vertices.len() {
        report.errors.push(StructuralError::DegenerateSimplex {
            kind,
            id,
            vertices: vertices.to_vec(),
        });
        ok = false;
    }
    ok
}

fn check_edges(complex: &SimplicialComplex, report: &mut ValidationReport) {
    for edge in complex.edges() {
        check_vertices(complex, SimplexKind::Edge, edge.id().get(), &edge.vertices(), report);
        if complex.edge_id(edge.key()) != Some(edge.id()) {
            report.errors.push(StructuralError::IndexMismatch {
                kind: SimplexKind::Edge,
                key: edge.key().to_string(),
            });
        }
    }
}

fn check_faces(complex: &SimplicialComplex, report: &mut ValidationReport) {
    let mut by_key: FastHashMap<FaceKey, Vec<FaceId>> = FastHashMap::default();
    for face in complex.faces() {
        let vertices = face.vertices();
        if !check_vertices(complex, SimplexKind::Face, face.id().get(), &vertices, report) {
            continue;
        }
        by_key.entry(face.key()).or_default().push(face.id());
        for key in face.edge_keys() {
            if complex.edge_id(key).is_none() {
                report.warnings.push(ValidationWarning::MissingSubSimplex {
                    kind: SimplexKind::Edge,
                    vertices: key.endpoints().to_vec(),
                });
            }
        }
    }
    let mut duplicates: Vec<(FaceKey, Vec<FaceId>)> =
        by_key.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
    duplicates.sort_unstable();
    for (key, faces) in duplicates {
        report
            .warnings
            .push(ValidationWarning::DuplicateFace { key, faces });
    }
}

fn check_tetrahedra(complex: &SimplicialComplex, report: &mut ValidationReport) {
    if complex.dimension() == Dimension::Two {
        let count = complex.number_of_tetrahedra();
        if count > 0 {
            report
                .errors
                .push(StructuralError::TetrahedraInPlanarComplex { count });
        }
    }

    for tet in complex.tetrahedra() {
        if !check_vertices(
            complex,
            SimplexKind::Tetrahedron,
            tet.id().get(),
            &tet.vertices(),
            report,
        ) {
            continue;
        }
        for face in tet.face_keys() {
            if !complex.face_tetrahedra_by_key(face).contains(&tet.id()) {
                report.errors.push(StructuralError::UnindexedTetrahedron {
                    tet: tet.id(),
                    face,
                });
            }
            if complex.face_id(face).is_none() {
                report.warnings.push(ValidationWarning::MissingSubSimplex {
                    kind: SimplexKind::Face,
                    vertices: face.vertices().to_vec(),
                });
            }
        }
    }

    let mut entries: Vec<(FaceKey, Vec<TetId>)> = complex
        .face_to_tetrahedra()
        .map(|(face, tets)| (face, tets.to_vec()))
        .collect();
    entries.sort_unstable();
    for (face, tets) in entries {
        if tets.len() > 2 {
            report.errors.push(StructuralError::NonManifoldFace {
                face,
                count: tets.len(),
                tetrahedra: tets.clone(),
            });
        }
        for tet in tets {
            let holds = complex
                .tetrahedron(tet)
                .is_some_and(|t| t.face_keys().contains(&face));
            if !holds {
                report
                    .errors
                    .push(StructuralError::StaleIndexEntry { face, tet });
            }
        }
    }
}

// =============================================================================
// MOVE PRECONDITIONS
// =============================================================================

/// A move's target fails its incidence requirement.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PreconditionError {
    /// The move belongs to the other dimension.
    #[error("Move {kind} is not valid in a {dimension} complex")]
    WrongDimension {
        /// The move.
        kind: PachnerMove,
        /// Dimension of the complex.
        dimension: Dimension,
    },
    /// The target has the wrong kind for the move.
    #[error("Move {kind} targets a {expected}, got {target}")]
    TargetKindMismatch {
        /// The move.
        kind: PachnerMove,
        /// Kind the move expects.
        expected: SimplexKind,
        /// The supplied target.
        target: MoveTarget,
    },
    /// The target does not exist.
    #[error("Target {target} does not exist")]
    MissingTarget {
        /// The supplied target.
        target: MoveTarget,
    },
    /// The target has the wrong number of incident simplices.
    #[error("Target {target} has {found} incident {incident} simplices, expected {expected}")]
    Incidence {
        /// The supplied target.
        target: MoveTarget,
        /// Kind of the counted simplices.
        incident: SimplexKind,
        /// Required count.
        expected: usize,
        /// Actual count.
        found: usize,
    },
    /// The star of the target has the wrong number of distinct outer (or ring) vertices.
    #[error("Target {target} has {found} distinct outer vertices, expected {expected}")]
    OuterVertices {
        /// The supplied target.
        target: MoveTarget,
        /// Required count.
        expected: usize,
        /// Actual count.
        found: usize,
    },
}

/// Checks `kind`'s incidence requirement on `target` without mutating anything.
///
/// # Errors
///
/// Returns the first [`PreconditionError`] found.
///
/// # Examples
///
/// ```rust
/// use pachner::core::algorithms::flips::{MoveTarget, PachnerMove};
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::core::validation::{PreconditionError, validate_pachner_move_preconditions};
///
/// let complex = SimplicialComplex::initial_triangle();
/// let edge = complex.edge_ids().next().unwrap();
/// let err = validate_pachner_move_preconditions(&complex, PachnerMove::TwoToTwo, MoveTarget::Edge(edge))
///     .unwrap_err();
/// assert!(matches!(err, PreconditionError::Incidence { expected: 2, found: 1, .. }));
/// ```
pub fn validate_pachner_move_preconditions(
    complex: &SimplicialComplex,
    kind: PachnerMove,
    target: MoveTarget,
) -> Result<(), PreconditionError> {
    if target.kind() != kind.target_kind() {
        return Err(PreconditionError::TargetKindMismatch {
            kind,
            expected: kind.target_kind(),
            target,
        });
    }
    if kind.dimension() != complex.dimension() {
        return Err(PreconditionError::WrongDimension {
            kind,
            dimension: complex.dimension(),
        });
    }
    let missing = PreconditionError::MissingTarget { target };
    let expect = |incident: SimplexKind, expected: usize, found: usize| {
        if found == expected {
            Ok(())
        } else {
            Err(PreconditionError::Incidence {
                target,
                incident,
                expected,
                found,
            })
        }
    };

    match target {
        MoveTarget::Face(id) => {
            let face = complex.face(id).ok_or(missing)?;
            if kind == PachnerMove::TwoToThree {
                expect(
                    SimplexKind::Tetrahedron,
                    2,
                    complex.face_tetrahedra_by_key(face.key()).len(),
                )?;
            }
        }
        MoveTarget::Tetrahedron(id) => {
            complex.tetrahedron(id).ok_or(missing)?;
        }
        MoveTarget::Edge(id) => {
            let key = complex.edge(id).ok_or(missing)?.key();
            let faces = complex.edge_faces(key);
            if kind == PachnerMove::TwoToTwo {
                expect(SimplexKind::Face, 2, faces.len())?;
            } else {
                let tets = complex.edge_tetrahedra(key);
                expect(SimplexKind::Tetrahedron, 3, tets.len())?;
                expect(SimplexKind::Face, 3, faces.len())?;
                let ring = ring_vertices(complex, key, &tets);
                if ring.len() != 3 {
                    return Err(PreconditionError::OuterVertices {
                        target,
                        expected: 3,
                        found: ring.len(),
                    });
                }
            }
        }
        MoveTarget::Vertex(vertex) => {
            if !complex.contains_vertex(vertex) {
                return Err(missing);
            }
            let edges = complex.vertex_edges(vertex).len();
            let faces = complex.vertex_faces(vertex);
            let expected_outer = if kind == PachnerMove::ThreeToOne {
                expect(SimplexKind::Face, 3, faces.len())?;
                expect(SimplexKind::Edge, 3, edges)?;
                3
            } else {
                let tets = complex.vertex_tetrahedra(vertex);
                expect(SimplexKind::Tetrahedron, 4, tets.len())?;
                expect(SimplexKind::Face, 6, faces.len())?;
                expect(SimplexKind::Edge, 4, edges)?;
                4
            };
            let outer = outer_vertices(complex, vertex);
            if outer.len() != expected_outer {
                return Err(PreconditionError::OuterVertices {
                    target,
                    expected: expected_outer,
                    found: outer.len(),
                });
            }
        }
    }
    Ok(())
}

/// Vertices of the top simplices around `vertex`, other than `vertex` itself.
pub(crate) fn outer_vertices(complex: &SimplicialComplex, vertex: VertexId) -> BTreeSet<VertexId> {
    let mut outer = BTreeSet::new();
    match complex.dimension() {
        Dimension::Two => {
            for face in complex.faces().filter(|f| f.contains(vertex)) {
                outer.extend(face.vertices().into_iter().filter(|&v| v != vertex));
            }
        }
        Dimension::Three => {
            for tet in complex.tetrahedra().filter(|t| t.contains(vertex)) {
                outer.extend(tet.vertices().into_iter().filter(|&v| v != vertex));
            }
        }
    }
    outer
}

/// Vertices of `tets` other than the endpoints of `edge`.
pub(crate) fn ring_vertices(
    complex: &SimplicialComplex,
    edge: EdgeKey,
    tets: &[TetId],
) -> BTreeSet<VertexId> {
    tets.iter()
        .filter_map(|&t| complex.tetrahedron(t))
        .flat_map(|t| t.vertices())
        .filter(|&v| !edge.contains(v))
        .collect()
}
