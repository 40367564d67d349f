//! Integration tests for boundary growth: glue and tent moves.
//!
//! ## Test Coverage
//!
//! - Symmetric glue around every edge of the seed triangle
//! - Random glue sequences with overlap prevention
//! - Mixed glue/tent sequences in 2D and 3D keeping χ and the structure intact
//! - Frozen boundary elements under the bottom-and-sides constraint

use approx::assert_relative_eq;
use pachner::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

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

fn seed(dimension: Dimension) -> (SimplicialComplex, Geometry) {
    SeedBuilder::new(dimension)
        .center(Point3::new(400.0, 300.0, 0.0))
        .scale(if dimension == Dimension::Two { 120.0 } else { 80.0 })
        .build()
}

fn assert_sound(complex: &SimplicialComplex, geometry: &Geometry) {
    assert_eq!(complex.euler_characteristic(), 1);
    let report = validate_simplicial_complex(complex);
    assert!(report.is_valid(), "{:?}", report.errors);
    assert_eq!(geometry.len(), complex.number_of_vertices());
    let check = validate_euler(complex);
    assert!(check.is_valid(), "{:?}", check.notes);
}

// =============================================================================
// GLUE
// =============================================================================

#[test]
fn test_symmetric_glue_on_every_seed_edge() {
    init_tracing();
    let (mut complex, mut geometry) = seed(Dimension::Two);
    let seed_area = total_measure(&complex, &geometry);
    let seed_edges = complex.boundary_elements();
    assert_eq!(seed_edges.len(), 3);

    for (i, &edge) in seed_edges.iter().enumerate() {
        glue(
            &mut complex,
            &mut geometry,
            edge,
            GlueMode::Symmetric,
            &FrozenBoundary::none(),
        )
        .unwrap();
        assert_eq!(complex.number_of_boundary_elements(), 3 + i + 1);
        assert!(!complex.is_boundary(edge));
    }

    // Four congruent equilateral triangles.
    assert_eq!(complex.number_of_faces(), 4);
    assert_relative_eq!(
        total_measure(&complex, &geometry),
        4.0 * seed_area,
        max_relative = 1e-9
    );
    assert_sound(&complex, &geometry);
    assert_eq!(complex.half_edges().len(), 12);
}

#[test]
fn test_random_glue_with_overlap_prevention_never_overlaps() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(99);
    let (mut complex, mut geometry) = seed(Dimension::Two);
    let frozen = FrozenBoundary::none();

    let mut grown = 0;
    for _ in 0..25 {
        match glue_random_boundary(
            &mut complex,
            &mut geometry,
            GlueMode::Fixed(60.0),
            true,
            &frozen,
            &mut rng,
        ) {
            Ok(info) => {
                grown += 1;
                assert!(info.attempts >= 1 && info.attempts <= MAX_GLUE_ATTEMPTS);
            }
            Err(err) => assert!(
                matches!(err, GrowthError::OverlapRejected { .. }),
                "unexpected error {err}"
            ),
        }
    }
    assert!(grown > 0);
    assert_eq!(complex.number_of_faces(), 1 + grown);
    assert_sound(&complex, &geometry);

    let triangles: Vec<[Point3<f64>; 3]> = complex
        .faces()
        .map(|f| geometry.require_all(f.vertices()).unwrap())
        .collect();
    for (i, first) in triangles.iter().enumerate() {
        for second in &triangles[i + 1..] {
            assert!(!triangles_overlap(first, second));
        }
    }
}

#[test]
fn test_glue_in_3d_keeps_faces_manifold() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(5);
    let (mut complex, mut geometry) = seed(Dimension::Three);
    for _ in 0..8 {
        let _ = glue_random_boundary(
            &mut complex,
            &mut geometry,
            GlueMode::Symmetric,
            true,
            &FrozenBoundary::none(),
            &mut rng,
        );
    }
    assert!(complex.number_of_tetrahedra() > 1);
    assert!(complex.face_to_tetrahedra().all(|(_, tets)| tets.len() <= 2));
    assert_sound(&complex, &geometry);
}

// =============================================================================
// MIXED GLUE AND TENT
// =============================================================================

fn grow_mixed(
    dimension: Dimension,
    seed_value: u64,
    steps: usize,
) -> (SimplicialComplex, Geometry) {
    let mut rng = StdRng::seed_from_u64(seed_value);
    let (mut complex, mut geometry) = seed(dimension);
    let frozen = FrozenBoundary::none();
    for _ in 0..steps {
        let before = complex.clone();
        let result = if rng.random::<f64>() < 0.3 {
            tent_random_vertex(&mut complex, &mut geometry, 50.0, &frozen, &mut rng)
        } else {
            glue_random_boundary(
                &mut complex,
                &mut geometry,
                GlueMode::Fixed(50.0),
                true,
                &frozen,
                &mut rng,
            )
        };
        match result {
            Ok(info) => {
                assert!(complex.contains_vertex(info.new_vertex));
                assert!(geometry.position(info.new_vertex).is_some());
            }
            Err(_) => assert_eq!(complex, before),
        }
        assert_eq!(complex.euler_characteristic(), 1);
    }
    (complex, geometry)
}

#[test]
fn test_mixed_growth_2d() {
    init_tracing();
    let (complex, geometry) = grow_mixed(Dimension::Two, 11, 30);
    assert!(complex.number_of_faces() > 1);
    assert_sound(&complex, &geometry);
    assert_eq!(connected_components(&complex), 1);
}

#[test]
fn test_mixed_growth_3d() {
    init_tracing();
    let (complex, geometry) = grow_mixed(Dimension::Three, 12, 20);
    assert!(complex.number_of_tetrahedra() > 1);
    assert!(complex.face_to_tetrahedra().all(|(_, tets)| tets.len() <= 2));
    assert_sound(&complex, &geometry);
}

#[test]
fn test_tent_on_triangle_apex_fills_the_corner() {
    let (mut complex, mut geometry) = seed(Dimension::Two);
    let apex = VertexId::new(0);
    let info = tent(&mut complex, &mut geometry, apex, 30.0, &FrozenBoundary::none()).unwrap();
    assert_eq!(info.kind, GrowthMove::Tent);
    assert_eq!(info.top_simplices_added, 2);
    assert_eq!(count_simplices(&complex).by_dim, vec![4, 6, 3]);
    // The new vertex sits above the apex, away from the seed.
    let top = geometry.position(apex).unwrap();
    let new = geometry.position(info.new_vertex).unwrap();
    assert_relative_eq!(new.x, top.x, epsilon = 1e-9);
    assert_relative_eq!(new.y, top.y + 30.0, epsilon = 1e-9);
    assert_sound(&complex, &geometry);
}

// =============================================================================
// FROZEN BOUNDARY
// =============================================================================

#[test]
fn test_bottom_and_sides_freezes_the_base_of_the_seed() {
    let (complex, geometry) = seed(Dimension::Two);
    let frozen = FrozenBoundary::compute(&BoundaryConstraint::BottomAndSides, &complex, &geometry);
    // Only the horizontal base edge lies on one of the planes.
    let base = complex.edge_between(VertexId::new(1), VertexId::new(2)).unwrap();
    assert_eq!(frozen.iter().collect::<Vec<_>>(), vec![BoundaryElement::Edge(base)]);

    let none = FrozenBoundary::compute(&BoundaryConstraint::None, &complex, &geometry);
    assert!(none.is_empty());

    let custom = FrozenBoundary::compute(
        &BoundaryConstraint::Custom(complex.boundary_elements()),
        &complex,
        &geometry,
    );
    assert_eq!(custom.len(), 3);
}

#[test]
fn test_frozen_base_survives_random_growth() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(31);
    let (mut complex, mut geometry) = seed(Dimension::Two);
    let frozen = FrozenBoundary::compute(&BoundaryConstraint::BottomAndSides, &complex, &geometry);
    assert_eq!(frozen.len(), 1);

    for _ in 0..15 {
        let _ = glue_random_boundary(
            &mut complex,
            &mut geometry,
            GlueMode::Symmetric,
            true,
            &frozen,
            &mut rng,
        );
        let _ = tent_random_vertex(&mut complex, &mut geometry, 40.0, &frozen, &mut rng);
        for element in frozen.iter() {
            assert!(complex.is_boundary(element));
        }
    }
    assert_sound(&complex, &geometry);
}
