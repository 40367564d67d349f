//! Immutable per-step records of a controller run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::algorithms::flips::PachnerMove;
use crate::core::boundary::BoundaryAnalysis;
use crate::core::complex::SimplicialComplex;
use crate::core::simplex::Dimension;
use crate::geometry::embedding::Geometry;
use crate::geometry::quality::total_measure;

/// Summary figures of one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetrics {
    /// Number of top simplices (faces in 2D, tetrahedra in 3D).
    pub total_simplices: usize,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Dimension of the complex.
    pub dimension: Dimension,
    /// Total area (2D) or volume (3D) of the top simplices.
    pub volume: f64,
    /// Euler characteristic.
    pub curvature: isize,
    /// Number of boundary elements.
    pub boundary_size: usize,
}

impl SnapshotMetrics {
    /// Computes the metrics of a complex and its geometry.
    #[must_use]
    pub fn compute(complex: &SimplicialComplex, geometry: &Geometry) -> Self {
        Self {
            total_simplices: complex.number_of_top_simplices(),
            vertex_count: complex.number_of_vertices(),
            dimension: complex.dimension(),
            volume: total_measure(complex, geometry),
            curvature: complex.euler_characteristic(),
            boundary_size: complex.number_of_boundary_elements(),
        }
    }
}

/// The complex and its geometry after one step, with the move that produced it.
///
/// `M` is the controller's move label: [`PachnerMove`] or
/// [`GrowthMove`](crate::core::algorithms::growth::GrowthMove).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "M: Serialize",
    deserialize = "M: Deserialize<'de> + Ord"
))]
pub struct Snapshot<M = PachnerMove> {
    /// Step index; 0 is the seed.
    pub step: usize,
    /// The complex after the step.
    pub complex: SimplicialComplex,
    /// Vertex positions after the step.
    pub geometry: Geometry,
    /// Move applied by the step, `None` for the seed.
    pub last_move: Option<M>,
    /// Cumulative number of successful applications of each move.
    pub move_counts: BTreeMap<M, usize>,
    /// Summary figures.
    pub metrics: SnapshotMetrics,
}

impl<M: Copy + Ord> Snapshot<M> {
    /// Records the current state of a run.
    #[must_use]
    pub fn capture(
        step: usize,
        complex: &SimplicialComplex,
        geometry: &Geometry,
        last_move: Option<M>,
        move_counts: BTreeMap<M, usize>,
    ) -> Self {
        Self {
            step,
            metrics: SnapshotMetrics::compute(complex, geometry),
            complex: complex.clone(),
            geometry: geometry.clone(),
            last_move,
            move_counts,
        }
    }

    /// Number of successful applications of `kind` up to this snapshot.
    #[must_use]
    pub fn move_count(&self, kind: M) -> usize {
        self.move_counts.get(&kind).copied().unwrap_or(0)
    }
}
