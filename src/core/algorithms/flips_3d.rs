//! 3D Pachner moves: 1-4, 2-3, 3-2 and 4-1.
//!
//! As in 2D, the incidence preconditions have been validated by the dispatcher. The
//! remaining checks here are the ones that depend on what the move would create: a new edge,
//! face, or tetrahedron must not already exist, and no face may end up with a third
//! tetrahedron.
//!
//! New tetrahedra reuse the vertex order of a tetrahedron they replace with one vertex
//! substituted, so 1-4 followed by 4-1 restores the original vertex order.

use crate::core::complex::SimplicialComplex;
use crate::core::edge::EdgeKey;
use crate::core::facet::FaceKey;
use crate::core::simplex::{
    EdgeId, FaceId, SimplexKind, TetId, Tetrahedron, VertexId, tetrahedron_face_triples,
};
use crate::core::validation::{PreconditionError, outer_vertices, ring_vertices};
use crate::geometry::embedding::Geometry;

use super::flips::{FlipError, FlipInfo, MoveTarget, PachnerMove};

fn missing(target: MoveTarget) -> FlipError {
    PreconditionError::MissingTarget { target }.into()
}

/// `vertices` with `from` replaced by `to`.
fn substitute(vertices: [VertexId; 4], from: VertexId, to: VertexId) -> [VertexId; 4] {
    vertices.map(|v| if v == from { to } else { v })
}

fn ensure_new_tetrahedron(
    complex: &SimplicialComplex,
    vertices: [VertexId; 4],
) -> Result<(), FlipError> {
    if complex.find_tetrahedron(vertices).is_some() {
        return Err(FlipError::DuplicateSimplex {
            kind: SimplexKind::Tetrahedron,
            vertices: vertices.to_vec(),
        });
    }
    Ok(())
}

/// Checks that adding `added` after removing `removed` leaves every face with at most two
/// tetrahedra.
fn ensure_manifold(
    complex: &SimplicialComplex,
    removed: &[Tetrahedron],
    added: &[[VertexId; 4]],
) -> Result<(), FlipError> {
    let mut pending: Vec<FaceKey> = added
        .iter()
        .flat_map(|&t| tetrahedron_face_triples(t).map(FaceKey::from))
        .collect();
    pending.sort_unstable();
    for group in pending.chunk_by(|a, b| a == b) {
        let face = group[0];
        let remaining = complex
            .face_tetrahedra_by_key(face)
            .iter()
            .filter(|t| !removed.iter().any(|r| r.id() == **t))
            .count();
        if remaining + group.len() > 2 {
            return Err(FlipError::NonManifoldFace { face });
        }
    }
    Ok(())
}

/// Adds all six edges and four faces of `vertices` (deduplicated) and the tetrahedron.
fn add_full_tetrahedron(
    complex: &mut SimplicialComplex,
    vertices: [VertexId; 4],
) -> Result<TetId, FlipError> {
    for key in crate::core::simplex::tetrahedron_edge_keys(vertices) {
        let [a, b] = key.endpoints();
        complex.add_edge(a, b)?;
    }
    for [a, b, c] in tetrahedron_face_triples(vertices) {
        complex.add_face(a, b, c)?;
    }
    let [a, b, c, d] = vertices;
    Ok(complex.add_tetrahedron(a, b, c, d)?)
}

/// Splits `tet` at a new interior vertex.
pub(crate) fn one_to_four(
    complex: &mut SimplicialComplex,
    geometry: Option<&mut Geometry>,
    tet: TetId,
) -> Result<FlipInfo, FlipError> {
    let original = *complex
        .tetrahedron(tet)
        .ok_or_else(|| missing(MoveTarget::Tetrahedron(tet)))?;
    let vertices = original.vertices();
    let position = geometry
        .as_deref()
        .map(|g| g.centroid_of(vertices))
        .transpose()?;

    let n = complex.add_vertex();
    if let (Some(geometry), Some(position)) = (geometry, position) {
        geometry.set_position(n, position);
    }
    complex.remove_tetrahedron(tet);
    for corner in vertices {
        add_full_tetrahedron(complex, substitute(vertices, corner, n))?;
    }

    Ok(FlipInfo {
        kind: PachnerMove::OneToFour,
        new_vertex: Some(n),
        removed_vertex: None,
    })
}

/// Replaces the two tetrahedra sharing `face` by three around the edge joining their
/// opposite vertices.
pub(crate) fn two_to_three(
    complex: &mut SimplicialComplex,
    face: FaceId,
) -> Result<FlipInfo, FlipError> {
    let target = MoveTarget::Face(face);
    let shared = complex.face(face).ok_or_else(|| missing(target))?.key();
    let [t1, t2] = match complex.face_tetrahedra_by_key(shared) {
        &[t1, t2] => [t1, t2],
        other => {
            return Err(PreconditionError::Incidence {
                target,
                incident: SimplexKind::Tetrahedron,
                expected: 2,
                found: other.len(),
            }
            .into());
        }
    };
    let first = *complex.tetrahedron(t1).ok_or_else(|| missing(target))?;
    let second = *complex.tetrahedron(t2).ok_or_else(|| missing(target))?;
    let d = first.opposite_vertex(shared).ok_or_else(|| missing(target))?;
    let e = second.opposite_vertex(shared).ok_or_else(|| missing(target))?;

    if complex.edge_between(d, e).is_some() {
        return Err(FlipError::DuplicateSimplex {
            kind: SimplexKind::Edge,
            vertices: vec![d, e],
        });
    }
    let new_tets = shared
        .vertices()
        .map(|corner| substitute(first.vertices(), corner, e));
    for vertices in new_tets {
        ensure_new_tetrahedron(complex, vertices)?;
    }
    ensure_manifold(complex, &[first, second], &new_tets)?;

    complex.remove_tetrahedron(t1);
    complex.remove_tetrahedron(t2);
    complex.remove_face(face);
    for vertices in new_tets {
        add_full_tetrahedron(complex, vertices)?;
    }

    Ok(FlipInfo {
        kind: PachnerMove::TwoToThree,
        new_vertex: None,
        removed_vertex: None,
    })
}

/// Replaces the three tetrahedra around `edge` by two sharing the face over its ring.
pub(crate) fn three_to_two(
    complex: &mut SimplicialComplex,
    edge: EdgeId,
) -> Result<FlipInfo, FlipError> {
    let target = MoveTarget::Edge(edge);
    let key: EdgeKey = complex.edge(edge).ok_or_else(|| missing(target))?.key();
    let tet_ids = complex.edge_tetrahedra(key);
    let star: Vec<Tetrahedron> = tet_ids
        .iter()
        .filter_map(|&t| complex.tetrahedron(t).copied())
        .collect();
    let ring: Vec<VertexId> = ring_vertices(complex, key, &tet_ids).into_iter().collect();
    let &[a, b, c] = ring.as_slice() else {
        return Err(PreconditionError::OuterVertices {
            target,
            expected: 3,
            found: ring.len(),
        }
        .into());
    };
    let [d, e] = key.endpoints();

    let ring_face = FaceKey::new(a, b, c);
    if complex.face_id(ring_face).is_some() {
        return Err(FlipError::DuplicateSimplex {
            kind: SimplexKind::Face,
            vertices: ring.clone(),
        });
    }
    // Keep the vertex order of a star tetrahedron, with one endpoint swapped for the ring
    // vertex it lacks.
    let first = star.first().ok_or_else(|| missing(target))?.vertices();
    let Some(&missing_ring) = ring.iter().find(|v| !first.contains(v)) else {
        return Err(missing(target));
    };
    let new_tets = [
        substitute(first, e, missing_ring),
        substitute(first, d, missing_ring),
    ];
    for vertices in new_tets {
        ensure_new_tetrahedron(complex, vertices)?;
    }
    ensure_manifold(complex, &star, &new_tets)?;

    let internal: Vec<FaceId> = complex.edge_faces(key);
    for tet in &star {
        complex.remove_tetrahedron(tet.id());
    }
    for face in internal {
        complex.remove_face(face);
    }
    complex.remove_edge(edge);
    for vertices in new_tets {
        add_full_tetrahedron(complex, vertices)?;
    }

    Ok(FlipInfo {
        kind: PachnerMove::ThreeToTwo,
        new_vertex: None,
        removed_vertex: None,
    })
}

/// Merges the four tetrahedra around `vertex` into one.
pub(crate) fn four_to_one(
    complex: &mut SimplicialComplex,
    geometry: Option<&mut Geometry>,
    vertex: VertexId,
) -> Result<FlipInfo, FlipError> {
    let target = MoveTarget::Vertex(vertex);
    let star: Vec<Tetrahedron> = complex
        .tetrahedra()
        .filter(|t| t.contains(vertex))
        .copied()
        .collect();
    let outer: Vec<VertexId> = outer_vertices(complex, vertex).into_iter().collect();
    let first = star.first().ok_or_else(|| missing(target))?.vertices();
    let Some(&replacement) = outer.iter().find(|v| !first.contains(v)) else {
        return Err(PreconditionError::OuterVertices {
            target,
            expected: 4,
            found: outer.len(),
        }
        .into());
    };
    let merged = substitute(first, vertex, replacement);
    ensure_new_tetrahedron(complex, merged)?;
    ensure_manifold(complex, &star, &[merged])?;

    let internal = complex.vertex_faces(vertex);
    let spokes = complex.vertex_edges(vertex);
    for tet in &star {
        complex.remove_tetrahedron(tet.id());
    }
    for face in internal {
        complex.remove_face(face);
    }
    for spoke in spokes {
        complex.remove_edge(spoke);
    }
    complex.remove_vertex(vertex)?;
    if let Some(geometry) = geometry {
        geometry.remove(vertex);
    }
    add_full_tetrahedron(complex, merged)?;

    Ok(FlipInfo {
        kind: PachnerMove::FourToOne,
        new_vertex: None,
        removed_vertex: Some(vertex),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::algorithms::flips::apply_pachner_move;
    use crate::core::validation::validate_simplicial_complex;
    use crate::geometry::embedding::Position;
    use crate::topology::characteristics::euler::count_simplices;

    fn init_tracing() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            let filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_test_writer()
                .try_init();
        });
    }

    fn shared_face(complex: &SimplicialComplex) -> FaceId {
        complex
            .faces()
            .find(|f| complex.face_tetrahedra_by_key(f.key()).len() == 2)
            .map(|f| f.id())
            .unwrap()
    }

    #[test]
    fn one_to_four_then_four_to_one_restores_the_tetrahedron() {
        init_tracing();
        let mut complex = SimplicialComplex::initial_tetrahedron();
        let mut geometry = Geometry::tetrahedron(Position::origin(), 1.0);
        let original = *complex.tetrahedra().next().unwrap();
        let before = count_simplices(&complex);

        let info = apply_pachner_move(
            &mut complex,
            Some(&mut geometry),
            PachnerMove::OneToFour,
            MoveTarget::Tetrahedron(original.id()),
        )
        .unwrap();
        let centre = info.new_vertex.unwrap();
        approx::assert_relative_eq!(
            geometry.position(centre).unwrap().coords.norm(),
            0.0,
            epsilon = 1e-12
        );
        assert_eq!(count_simplices(&complex).by_dim, vec![5, 10, 10, 4]);
        assert!(validate_simplicial_complex(&complex).is_valid());

        apply_pachner_move(
            &mut complex,
            Some(&mut geometry),
            PachnerMove::FourToOne,
            MoveTarget::Vertex(centre),
        )
        .unwrap();
        assert_eq!(count_simplices(&complex), before);
        assert_eq!(complex.tetrahedra().next().unwrap().vertices(), original.vertices());
        assert!(geometry.position(centre).is_none());
    }

    #[test]
    fn two_to_three_then_three_to_two_round_trip() {
        init_tracing();
        let mut complex = SimplicialComplex::tetrahedron_strip(2);
        let before = count_simplices(&complex);
        let face = shared_face(&complex);

        apply_pachner_move(&mut complex, None, PachnerMove::TwoToThree, MoveTarget::Face(face))
            .unwrap();
        assert_eq!(count_simplices(&complex).by_dim, vec![5, 10, 9, 3]);
        assert!(validate_simplicial_complex(&complex).is_valid());

        // The new edge joins the two former apexes, 0 and 4.
        let edge = complex
            .edge_between(VertexId::new(0), VertexId::new(4))
            .unwrap();
        apply_pachner_move(&mut complex, None, PachnerMove::ThreeToTwo, MoveTarget::Edge(edge))
            .unwrap();
        assert_eq!(count_simplices(&complex), before);
        assert!(validate_simplicial_complex(&complex).is_valid());
        assert!(complex
            .face_id(FaceKey::new(VertexId::new(1), VertexId::new(2), VertexId::new(3)))
            .is_some());
    }

    #[test]
    fn two_to_three_rejects_existing_edge() {
        init_tracing();
        let mut complex = SimplicialComplex::tetrahedron_strip(2);
        complex
            .add_edge(VertexId::new(0), VertexId::new(4))
            .unwrap();
        let before = complex.clone();
        let face = shared_face(&complex);
        let err = apply_pachner_move(&mut complex, None, PachnerMove::TwoToThree, MoveTarget::Face(face))
            .unwrap_err();
        assert!(matches!(
            err,
            FlipError::DuplicateSimplex {
                kind: SimplexKind::Edge,
                ..
            }
        ));
        assert_eq!(complex, before);
    }

    #[test]
    fn four_to_one_needs_an_isolated_star() {
        init_tracing();
        let mut complex = SimplicialComplex::tetrahedron_strip(2);
        let before = complex.clone();
        let err = apply_pachner_move(
            &mut complex,
            None,
            PachnerMove::FourToOne,
            MoveTarget::Vertex(VertexId::new(1)),
        )
        .unwrap_err();
        assert!(matches!(err, FlipError::Precondition(_)));
        assert_eq!(complex, before);
    }

    #[test]
    fn one_to_four_without_positions_fails_cleanly() {
        init_tracing();
        let mut complex = SimplicialComplex::initial_tetrahedron();
        let mut geometry = Geometry::new();
        let before = complex.clone();
        let tet = complex.tetrahedron_ids().next().unwrap();
        let err = apply_pachner_move(
            &mut complex,
            Some(&mut geometry),
            PachnerMove::OneToFour,
            MoveTarget::Tetrahedron(tet),
        )
        .unwrap_err();
        assert!(matches!(err, FlipError::Geometry(_)));
        assert_eq!(complex, before);
        assert!(geometry.is_empty());
    }
}
