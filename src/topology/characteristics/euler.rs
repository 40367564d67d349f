//! Euler characteristic of simplicial complexes.
//!
//! χ = Σ(-1)^k · `f_k`, where `f_k` is the number of `k`-simplices. For a 2D complex this is
//! V − E + F, for a 3D complex V − E + F − T. Every Pachner move leaves χ unchanged.
//!
//! Counts are taken directly from the entity collections, so an edge or face that exists
//! only implicitly as a side of a higher simplex is not counted. The move operators always
//! register every sub-simplex, which keeps the explicit and implicit counts equal.
//!
//! # Examples
//!
//! ```rust
//! use pachner::core::complex::SimplicialComplex;
//! use pachner::topology::characteristics::euler;
//!
//! let complex = SimplicialComplex::initial_tetrahedron();
//! let counts = euler::count_simplices(&complex);
//! assert_eq!(counts.by_dim, vec![4, 6, 4, 1]);
//! assert_eq!(euler::euler_characteristic(&counts), 1);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::boundary::BoundaryAnalysis;
use crate::core::collections::FastHashSet;
use crate::core::complex::SimplicialComplex;
use crate::core::simplex::Dimension;

/// Errors from topological classification.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyError {
    /// Counting found data inconsistent with the complex's dimension.
    #[error("Failed to count simplices: {0}")]
    Counting(String),
}

/// Counts of `k`-simplices for `0 ≤ k ≤ d`.
///
/// Commonly called the **f-vector**: `by_dim[0]` vertices, `by_dim[1]` edges,
/// `by_dim[2]` faces and, in 3D, `by_dim[3]` tetrahedra.
///
/// # Examples
///
/// ```rust
/// use pachner::topology::characteristics::euler::FVector;
///
/// let counts = FVector { by_dim: vec![3, 3, 1] };
/// assert_eq!(counts.count(1), 3);
/// assert_eq!(counts.count(3), 0);
/// assert_eq!(counts.dimension(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FVector {
    /// `by_dim[k]` = `f_k` = number of `k`-simplices.
    pub by_dim: Vec<usize>,
}

impl FVector {
    /// Number of `k`-simplices; 0 if `k` is out of range.
    #[must_use]
    #[inline]
    pub fn count(&self, k: usize) -> usize {
        self.by_dim.get(k).copied().unwrap_or(0)
    }

    /// Highest `k` stored.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.by_dim.len().saturating_sub(1)
    }

    /// Entry-wise `after − before`, padded to the longer vector.
    #[must_use]
    pub fn delta(before: &Self, after: &Self) -> Vec<isize> {
        let len = before.by_dim.len().max(after.by_dim.len());
        (0..len)
            .map(|k| to_isize(after.count(k)) - to_isize(before.count(k)))
            .collect()
    }
}

/// Topological classification of a complex.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyClassification {
    /// No top simplices (χ = number of loose vertices, usually 0).
    Empty,
    /// A single top simplex of the given dimension.
    SingleSimplex(usize),
    /// A connected pure complex with boundary; expected to be a disc or ball.
    Ball(usize),
    /// A connected pure complex without boundary.
    ClosedSphere(usize),
    /// Disconnected, or otherwise outside the known categories.
    Unknown,
}

/// Counts the vertices, edges, faces and (3D) tetrahedra of `complex`.
#[must_use]
pub fn count_simplices(complex: &SimplicialComplex) -> FVector {
    let mut by_dim = vec![
        complex.number_of_vertices(),
        complex.number_of_edges(),
        complex.number_of_faces(),
    ];
    if complex.dimension() == Dimension::Three {
        by_dim.push(complex.number_of_tetrahedra());
    }
    FVector { by_dim }
}

/// Counts the simplices of the boundary: boundary elements and their sub-simplices.
///
/// The result has one entry fewer than [`count_simplices`].
///
/// # Errors
///
/// Returns [`TopologyError::Counting`] if a boundary element cannot be resolved.
pub fn count_boundary_simplices(complex: &SimplicialComplex) -> Result<FVector, TopologyError> {
    let elements = complex.boundary_elements();
    let mut vertices = FastHashSet::default();
    let mut edges = FastHashSet::default();
    for &element in &elements {
        let simplex = crate::core::boundary::element_vertices(complex, element)
            .map_err(|e| TopologyError::Counting(e.to_string()))?;
        vertices.extend(simplex.iter().copied());
        for (i, &a) in simplex.iter().enumerate() {
            for &b in &simplex[i + 1..] {
                edges.insert(crate::core::edge::EdgeKey::new(a, b));
            }
        }
    }
    let by_dim = match complex.dimension() {
        Dimension::Two => vec![vertices.len(), elements.len()],
        Dimension::Three => vec![vertices.len(), edges.len(), elements.len()],
    };
    Ok(FVector { by_dim })
}

/// Alternating sum of an f-vector.
///
/// # Examples
///
/// ```rust
/// use pachner::topology::characteristics::euler::{FVector, euler_characteristic};
///
/// assert_eq!(euler_characteristic(&FVector { by_dim: vec![4, 6, 4, 1] }), 1);
/// assert_eq!(euler_characteristic(&FVector { by_dim: vec![4, 6, 4] }), 2);
/// ```
#[must_use]
pub fn euler_characteristic(counts: &FVector) -> isize {
    counts
        .by_dim
        .iter()
        .enumerate()
        .map(|(k, &f_k)| {
            let f_k = to_isize(f_k);
            if k % 2 == 0 { f_k } else { -f_k }
        })
        .sum()
}

/// Classifies `complex` by its top-simplex count, boundary, and connectivity.
#[must_use]
pub fn classify_complex(complex: &SimplicialComplex) -> TopologyClassification {
    let d = complex.dimension().as_usize();
    match complex.number_of_top_simplices() {
        0 => TopologyClassification::Empty,
        1 => TopologyClassification::SingleSimplex(d),
        _ if crate::topology::homology::connected_components(complex) != 1 => {
            TopologyClassification::Unknown
        }
        _ if complex.number_of_boundary_elements() > 0 => TopologyClassification::Ball(d),
        _ => TopologyClassification::ClosedSphere(d),
    }
}

/// Expected χ for a classification, or `None` if unknown.
///
/// A closed `d`-sphere has χ = 1 + (−1)^d.
#[must_use]
pub const fn expected_chi_for(classification: &TopologyClassification) -> Option<isize> {
    match classification {
        TopologyClassification::Empty => Some(0),
        TopologyClassification::SingleSimplex(_) | TopologyClassification::Ball(_) => Some(1),
        TopologyClassification::ClosedSphere(d) => Some(if *d % 2 == 0 { 2 } else { 0 }),
        TopologyClassification::Unknown => None,
    }
}

fn to_isize(value: usize) -> isize {
    isize::try_from(value).unwrap_or(isize::MAX)
}
