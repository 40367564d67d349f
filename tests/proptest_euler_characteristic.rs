//! Property-based tests for Euler characteristic invariance under Pachner moves.
//!
//! ## Test Properties
//!
//! 1. **χ Invariance**: χ never changes along a random move sequence
//! 2. **Exact Deltas**: every successful move changes the f-vector by its table entry
//! 3. **Atomic Failure**: a rejected move leaves the complex untouched
//! 4. **Structural Soundness**: the structural validator stays clean
//!
//! For deterministic tests with known configurations, see `euler_characteristic.rs`.

use pachner::prelude::*;
use proptest::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

/// Strategy for a sequence of (move index, target index) picks.
fn move_sequence(max_len: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..4_usize, any::<usize>()), 1..max_len)
}

fn seeded(dimension: Dimension) -> (SimplicialComplex, Geometry) {
    SeedBuilder::new(dimension)
        .center(Point3::new(400.0, 300.0, 0.0))
        .build()
}

// =============================================================================
// PROPERTY-BASED TESTS - RANDOM MOVE SEQUENCES
// =============================================================================

/// Generates χ-invariance properties for one dimension.
///
/// Each pick selects a move from `PachnerMove::moves_for` (modulo the number of moves) and a
/// target from its eligible candidates (modulo the number of candidates).
macro_rules! test_move_sequence_properties {
    ($dim:literal, $dimension:expr, $chi:literal, $max_len:literal) => {
        pastey::paste! {
            proptest! {
                /// Property: χ and the f-vector deltas follow the move table.
                #[test]
                fn [<prop_moves_preserve_euler_ $dim d>](picks in move_sequence($max_len)) {
                    let (mut complex, mut geometry) = seeded($dimension);
                    let moves = PachnerMove::moves_for($dimension);
                    for (move_pick, target_pick) in picks {
                        let kind = moves[move_pick % moves.len()];
                        let targets = eligible_targets(&complex, kind);
                        if targets.is_empty() {
                            continue;
                        }
                        let target = targets[target_pick % targets.len()];

                        let before = count_simplices(&complex);
                        let snapshot = complex.clone();
                        match apply_pachner_move(&mut complex, Some(&mut geometry), kind, target) {
                            Ok(_) => {
                                let after = count_simplices(&complex);
                                let delta = check_move_preserves_euler(&before, &after, kind);
                                prop_assert!(delta.preserves_euler(), "{} on {}: {:?}", kind, target, delta);
                                prop_assert!(delta.matches_expected(), "{} on {}: {:?}", kind, target, delta);
                            }
                            Err(_) => prop_assert_eq!(&complex, &snapshot),
                        }
                        prop_assert_eq!(complex.euler_characteristic(), $chi);
                    }
                    let report = validate_simplicial_complex(&complex);
                    prop_assert!(report.is_valid(), "{:?}", report.errors);
                    prop_assert_eq!(geometry.len(), complex.number_of_vertices());
                }

                /// Property: the Euler report agrees with the classification after any sequence.
                #[test]
                fn [<prop_euler_matches_classification_ $dim d>](picks in move_sequence($max_len)) {
                    let (mut complex, mut geometry) = seeded($dimension);
                    let moves = PachnerMove::moves_for($dimension);
                    for (move_pick, target_pick) in picks {
                        let kind = moves[move_pick % moves.len()];
                        let targets = eligible_targets(&complex, kind);
                        if let Some(&target) = targets.get(target_pick % targets.len().max(1)) {
                            let _ = apply_pachner_move(&mut complex, Some(&mut geometry), kind, target);
                        }
                    }
                    let result = validate_euler(&complex);
                    prop_assert!(result.is_valid(), "{:?}", result.notes);
                    prop_assert_eq!(result.chi, $chi);
                    let betti = estimate_betti_numbers(&complex);
                    prop_assert_eq!(betti.b0, 1);
                    prop_assert_eq!(betti.euler_characteristic(), result.chi);
                }
            }
        }
    };
}

test_move_sequence_properties!(2, Dimension::Two, 1, 40);
test_move_sequence_properties!(3, Dimension::Three, 1, 30);
