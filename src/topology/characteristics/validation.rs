//! Euler characteristic checks for complexes and individual moves.
//!
//! [`validate_euler`] combines counting, classification and the expected χ into one report.
//! [`check_move_preserves_euler`] compares f-vectors taken before and after a Pachner move
//! against the move's exact combinatorial delta.

use serde::{Deserialize, Serialize};

use crate::core::algorithms::flips::PachnerMove;
use crate::core::complex::SimplicialComplex;
use crate::topology::characteristics::euler::{
    FVector, TopologyClassification, classify_complex, count_simplices, euler_characteristic,
    expected_chi_for,
};

/// Result of Euler characteristic validation.
///
/// # Examples
///
/// ```rust
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::topology::characteristics::validation::validate_euler;
///
/// let result = validate_euler(&SimplicialComplex::triangle_strip(4));
/// assert_eq!(result.chi, 1);
/// assert!(result.is_valid());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyCheckResult {
    /// Computed Euler characteristic.
    pub chi: isize,
    /// Expected χ based on classification (`None` if unknown).
    pub expected: Option<isize>,
    /// Topological classification.
    pub classification: TopologyClassification,
    /// Full simplex counts.
    pub counts: FVector,
    /// Diagnostic notes.
    pub notes: Vec<String>,
}

impl TopologyCheckResult {
    /// Returns `true` if χ matches the expectation, or if nothing is expected.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.expected.is_none_or(|exp| self.chi == exp)
    }
}

/// Counts, classifies and checks the Euler characteristic of `complex`.
#[must_use]
pub fn validate_euler(complex: &SimplicialComplex) -> TopologyCheckResult {
    let counts = count_simplices(complex);
    let chi = euler_characteristic(&counts);
    let classification = classify_complex(complex);
    let expected = expected_chi_for(&classification);

    let mut notes = Vec::new();
    if let Some(exp) = expected.filter(|&exp| chi != exp) {
        notes.push(format!(
            "Euler characteristic mismatch: computed {chi}, expected {exp}"
        ));
    }

    TopologyCheckResult {
        chi,
        expected,
        classification,
        counts,
        notes,
    }
}

/// Before/after comparison for one Pachner move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EulerDelta {
    /// The move that was applied.
    pub kind: PachnerMove,
    /// χ before the move.
    pub chi_before: isize,
    /// χ after the move.
    pub chi_after: isize,
    /// Observed `after − before` per dimension.
    pub observed: Vec<isize>,
    /// The move's exact delta per dimension.
    pub expected: Vec<isize>,
}

impl EulerDelta {
    /// Returns `true` if χ is unchanged.
    #[must_use]
    pub const fn preserves_euler(&self) -> bool {
        self.chi_before == self.chi_after
    }

    /// Returns `true` if the observed f-vector delta equals the move's delta.
    #[must_use]
    pub fn matches_expected(&self) -> bool {
        self.observed == self.expected
    }
}

/// Compares f-vectors around a move.
///
/// # Examples
///
/// ```rust
/// use pachner::core::algorithms::flips::PachnerMove;
/// use pachner::topology::characteristics::euler::FVector;
/// use pachner::topology::characteristics::validation::check_move_preserves_euler;
///
/// let before = FVector { by_dim: vec![3, 3, 1] };
/// let after = FVector { by_dim: vec![4, 6, 3] };
/// let delta = check_move_preserves_euler(&before, &after, PachnerMove::OneToThree);
/// assert!(delta.preserves_euler());
/// assert!(delta.matches_expected());
/// ```
#[must_use]
pub fn check_move_preserves_euler(
    before: &FVector,
    after: &FVector,
    kind: PachnerMove,
) -> EulerDelta {
    let delta = EulerDelta {
        kind,
        chi_before: euler_characteristic(before),
        chi_after: euler_characteristic(after),
        observed: FVector::delta(before, after),
        expected: kind.simplex_delta().to_vec(),
    };
    if !delta.preserves_euler() {
        tracing::warn!(
            move_kind = %kind,
            chi_before = delta.chi_before,
            chi_after = delta.chi_after,
            "move changed the Euler characteristic"
        );
    }
    delta
}
