//! 2D Pachner moves: 1-3, 2-2 and 3-1.
//!
//! Callers go through [`apply_pachner_move`](super::flips::apply_pachner_move), which has
//! already validated the incidence preconditions. The functions here gather their context,
//! run the remaining checks and only then mutate.
//!
//! Face orientation is preserved: new faces inherit the cyclic order of the faces they
//! replace, so a consistently oriented complex stays consistently oriented.

use crate::core::complex::SimplicialComplex;
use crate::core::facet::FaceKey;
use crate::core::simplex::{EdgeId, Face, FaceId, SimplexKind, VertexId};
use crate::core::validation::{PreconditionError, outer_vertices};
use crate::geometry::embedding::Geometry;
use crate::geometry::quality::is_strictly_convex_quadrilateral;

use super::flips::{FlipError, FlipInfo, MoveTarget, PachnerMove};

/// `face`'s vertices rotated so that `vertex` comes first.
fn rotate_to_front(face: &Face, vertex: VertexId) -> Option<[VertexId; 3]> {
    let v = face.vertices();
    let i = v.iter().position(|&x| x == vertex)?;
    Some([v[i], v[(i + 1) % 3], v[(i + 2) % 3]])
}

fn missing(target: MoveTarget) -> FlipError {
    PreconditionError::MissingTarget { target }.into()
}

fn missing_face(face: FaceId) -> FlipError {
    missing(MoveTarget::Face(face))
}

fn duplicate_face(vertices: [VertexId; 3]) -> FlipError {
    FlipError::DuplicateSimplex {
        kind: SimplexKind::Face,
        vertices: vertices.to_vec(),
    }
}

/// Splits `face` at a new interior vertex.
pub(crate) fn one_to_three(
    complex: &mut SimplicialComplex,
    geometry: Option<&mut Geometry>,
    face: FaceId,
) -> Result<FlipInfo, FlipError> {
    let [a, b, c] = complex.face(face).ok_or_else(|| missing_face(face))?.vertices();
    let position = geometry
        .as_deref()
        .map(|g| g.centroid_of([a, b, c]))
        .transpose()?;

    let n = complex.add_vertex();
    if let (Some(geometry), Some(position)) = (geometry, position) {
        geometry.set_position(n, position);
    }
    complex.remove_face(face);
    for corner in [a, b, c] {
        complex.add_edge(corner, n)?;
    }
    complex.add_face(a, b, n)?;
    complex.add_face(b, c, n)?;
    complex.add_face(c, a, n)?;

    Ok(FlipInfo {
        kind: PachnerMove::OneToThree,
        new_vertex: Some(n),
        removed_vertex: None,
    })
}

/// Replaces `edge` by the other diagonal of the quadrilateral formed by its two faces.
pub(crate) fn two_to_two(
    complex: &mut SimplicialComplex,
    geometry: Option<&mut Geometry>,
    edge: EdgeId,
) -> Result<FlipInfo, FlipError> {
    let key = complex
        .edge(edge)
        .ok_or_else(|| missing(MoveTarget::Edge(edge)))?
        .key();
    let [f1, f2] = match complex.edge_faces(key).as_slice() {
        &[f1, f2] => [f1, f2],
        other => {
            return Err(PreconditionError::Incidence {
                target: MoveTarget::Edge(edge),
                incident: SimplexKind::Face,
                expected: 2,
                found: other.len(),
            }
            .into());
        }
    };
    let first = *complex.face(f1).ok_or_else(|| missing_face(f1))?;
    let second = *complex.face(f2).ok_or_else(|| missing_face(f2))?;
    let c = first.opposite_vertex(key).ok_or_else(|| missing_face(f1))?;
    let d = second.opposite_vertex(key).ok_or_else(|| missing_face(f2))?;

    // Orient so that the first face runs a → b → c.
    let [u, w] = key.endpoints();
    let (a, b) = if first.has_directed_edge(u, w) {
        (u, w)
    } else {
        (w, u)
    };

    if complex.edge_between(c, d).is_some() {
        return Err(FlipError::DuplicateSimplex {
            kind: SimplexKind::Edge,
            vertices: vec![c, d],
        });
    }
    let new_faces = [[a, d, c], [d, b, c]];
    for vertices in new_faces {
        if complex.face_id(FaceKey::from(vertices)).is_some() {
            return Err(duplicate_face(vertices));
        }
    }
    if let Some(geometry) = geometry.as_deref() {
        let [pa, pb, pc, pd] = geometry.require_all([a, b, c, d])?;
        // Boundary order of the quadrilateral: a, d, b, c.
        if !is_strictly_convex_quadrilateral(&pa, &pd, &pb, &pc) {
            return Err(FlipError::NonConvexQuadrilateral { edge });
        }
    }

    complex.remove_face(f1);
    complex.remove_face(f2);
    complex.remove_edge(edge);
    complex.add_edge(c, d)?;
    for [x, y, z] in new_faces {
        complex.add_face(x, y, z)?;
    }

    Ok(FlipInfo {
        kind: PachnerMove::TwoToTwo,
        new_vertex: None,
        removed_vertex: None,
    })
}

/// Merges the three faces around `vertex` into one.
pub(crate) fn three_to_one(
    complex: &mut SimplicialComplex,
    geometry: Option<&mut Geometry>,
    vertex: VertexId,
) -> Result<FlipInfo, FlipError> {
    let faces: Vec<Face> = complex
        .faces()
        .filter(|f| f.contains(vertex))
        .copied()
        .collect();
    let spokes = complex.vertex_edges(vertex);
    let outer: Vec<VertexId> = outer_vertices(complex, vertex).into_iter().collect();

    // The outer triangle keeps the orientation of the first face of the fan.
    let [_, p, q] = faces
        .first()
        .and_then(|f| rotate_to_front(f, vertex))
        .ok_or_else(|| missing(MoveTarget::Vertex(vertex)))?;
    let Some(&r) = outer.iter().find(|&&x| x != p && x != q) else {
        return Err(PreconditionError::OuterVertices {
            target: MoveTarget::Vertex(vertex),
            expected: 3,
            found: outer.len(),
        }
        .into());
    };
    if complex.face_id(FaceKey::new(p, q, r)).is_some() {
        return Err(duplicate_face([p, q, r]));
    }

    for face in &faces {
        complex.remove_face(face.id());
    }
    for spoke in spokes {
        complex.remove_edge(spoke);
    }
    complex.remove_vertex(vertex)?;
    if let Some(geometry) = geometry {
        geometry.remove(vertex);
    }
    for (x, y) in [(p, q), (q, r), (r, p)] {
        complex.add_edge(x, y)?;
    }
    complex.add_face(p, q, r)?;

    Ok(FlipInfo {
        kind: PachnerMove::ThreeToOne,
        new_vertex: None,
        removed_vertex: Some(vertex),
    })
}
