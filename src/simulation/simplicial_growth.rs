//! A controller that evolves a closed-boundary complex by weighted random Pachner moves.
//!
//! Each step draws a move kind from the configured weights, then tries up to
//! [`MAX_TARGET_ATTEMPTS`] random eligible targets for it. If none succeeds, the inverse move
//! is tried the same way. If that also fails the step reports
//! [`ControllerError::MoveFailed`] and nothing changes.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::core::algorithms::flips::{
    FlipError, FlipInfo, PachnerMove, apply_pachner_move, eligible_targets,
};
use crate::core::builder::SeedBuilder;
use crate::core::complex::SimplicialComplex;
use crate::core::simplex::Dimension;
use crate::geometry::embedding::{Geometry, Position};
use crate::simulation::controller::{ControllerError, History, SimulationController};
use crate::simulation::params::{
    MoveProbabilities, SEED_CENTER, SimplicialGrowthParams, seed_scale,
};
use crate::simulation::snapshot::Snapshot;

/// Number of random targets tried per move kind in one step.
pub const MAX_TARGET_ATTEMPTS: usize = 8;

/// The complex being evolved and its bookkeeping.
#[derive(Clone, Debug)]
struct Run {
    params: SimplicialGrowthParams,
    complex: SimplicialComplex,
    geometry: Geometry,
    counts: BTreeMap<PachnerMove, usize>,
}

/// Drives a complex with weighted random Pachner moves.
///
/// Generic over the random source so runs can be reproduced; [`seeded`](Self::seeded) is the
/// usual way to build one.
///
/// # Examples
///
/// ```rust
/// use pachner::prelude::*;
///
/// let params = SimplicialGrowthParamsBuilder::default()
///     .dimension(Dimension::Two)
///     .move_probabilities(MoveProbabilities::for_dimension(Dimension::Two))
///     .build()
///     .unwrap();
/// let mut controller = SimplicialGrowthController::seeded(42);
/// controller.initialize(params).unwrap();
///
/// let successes = (0..10).filter(|_| controller.step().is_ok()).count();
/// assert_eq!(controller.history().len(), successes + 1);
/// for snapshot in controller.history() {
///     assert_eq!(snapshot.metrics.curvature, 1);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct SimplicialGrowthController<R = StdRng> {
    rng: R,
    run: Option<Run>,
    history: History<PachnerMove>,
}

impl SimplicialGrowthController<StdRng> {
    /// A controller drawing from a [`StdRng`] seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SimplicialGrowthController<StdRng> {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> SimplicialGrowthController<R> {
    /// A controller drawing from `rng`.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            run: None,
            history: History::default(),
        }
    }

    /// Parameters of the current run.
    #[must_use]
    pub fn params(&self) -> Option<&SimplicialGrowthParams> {
        self.run.as_ref().map(|run| &run.params)
    }

    /// The live complex: the result of the latest step, regardless of the cursor.
    #[must_use]
    pub fn complex(&self) -> Option<&SimplicialComplex> {
        self.run.as_ref().map(|run| &run.complex)
    }

    /// The live geometry.
    #[must_use]
    pub fn geometry(&self) -> Option<&Geometry> {
        self.run.as_ref().map(|run| &run.geometry)
    }
}

/// Draws a move for `dimension` with probability proportional to its weight.
fn select_move<R: Rng + ?Sized>(
    weights: &MoveProbabilities,
    dimension: Dimension,
    rng: &mut R,
) -> PachnerMove {
    let moves = PachnerMove::moves_for(dimension);
    let total = weights.total(dimension);
    let draw = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for &kind in moves {
        cumulative += weights.weight(kind);
        if draw < cumulative {
            return kind;
        }
    }
    // Rounding can leave `draw` at the very top; take the last weighted move.
    moves
        .iter()
        .rev()
        .copied()
        .find(|&k| weights.weight(k) > 0.0)
        .unwrap_or(moves[0])
}

/// Tries `kind` on up to [`MAX_TARGET_ATTEMPTS`] random eligible targets.
///
/// Returns `Err(None)` when there is no eligible target at all.
fn try_move<R: Rng + ?Sized>(
    complex: &mut SimplicialComplex,
    geometry: &mut Geometry,
    kind: PachnerMove,
    rng: &mut R,
) -> Result<FlipInfo, Option<FlipError>> {
    let mut targets = eligible_targets(complex, kind);
    targets.shuffle(rng);
    let mut last_error = None;
    for target in targets.into_iter().take(MAX_TARGET_ATTEMPTS) {
        match apply_pachner_move(complex, Some(&mut *geometry), kind, target) {
            Ok(info) => return Ok(info),
            Err(err) => {
                tracing::trace!(move_kind = %kind, %target, error = %err, "target rejected");
                last_error = Some(err);
            }
        }
    }
    Err(last_error)
}

fn describe(error: Option<FlipError>) -> String {
    error.map_or_else(|| "no eligible target".to_string(), |e| e.to_string())
}

impl<R: Rng> SimulationController for SimplicialGrowthController<R> {
    type Params = SimplicialGrowthParams;
    type Move = PachnerMove;

    fn initialize(&mut self, params: SimplicialGrowthParams) -> Result<(), ControllerError> {
        params.validate()?;
        let (complex, geometry) = SeedBuilder::new(params.dimension)
            .shape(params.seed_shape())
            .center(Position::from(SEED_CENTER))
            .scale(seed_scale(params.dimension))
            .build();
        let counts: BTreeMap<PachnerMove, usize> = PachnerMove::moves_for(params.dimension)
            .iter()
            .map(|&k| (k, 0))
            .collect();
        self.history.restart(Snapshot::capture(
            0,
            &complex,
            &geometry,
            None,
            counts.clone(),
        ));
        tracing::debug!(
            dimension = %params.dimension,
            vertices = complex.number_of_vertices(),
            top_simplices = complex.number_of_top_simplices(),
            "initialized simplicial growth"
        );
        self.run = Some(Run {
            params,
            complex,
            geometry,
            counts,
        });
        Ok(())
    }

    fn step(&mut self) -> Result<&Snapshot<PachnerMove>, ControllerError> {
        let run = self.run.as_mut().ok_or(ControllerError::NotInitialized)?;
        let max_steps = run.params.max_steps;
        if self.history.steps_taken() >= max_steps {
            return Err(ControllerError::MaxStepsReached { max_steps });
        }

        let dimension = run.params.dimension;
        let primary = select_move(&run.params.move_probabilities, dimension, &mut self.rng);
        let applied = match try_move(&mut run.complex, &mut run.geometry, primary, &mut self.rng) {
            Ok(_) => primary,
            Err(first) => {
                let fallback = primary.inverse();
                tracing::debug!(
                    move_kind = %primary,
                    %fallback,
                    reason = %describe(first),
                    "move failed, trying inverse"
                );
                match try_move(&mut run.complex, &mut run.geometry, fallback, &mut self.rng) {
                    Ok(_) => fallback,
                    Err(second) => {
                        let reason = describe(second);
                        tracing::warn!(move_kind = %primary, %fallback, %reason, "step failed");
                        return Err(ControllerError::MoveFailed {
                            primary: primary.to_string(),
                            fallback: fallback.to_string(),
                            reason,
                        });
                    }
                }
            }
        };

        *run.counts.entry(applied).or_default() += 1;
        let step = self.history.steps_taken() + 1;
        let snapshot = Snapshot::capture(
            step,
            &run.complex,
            &run.geometry,
            Some(applied),
            run.counts.clone(),
        );
        tracing::debug!(
            step,
            move_kind = %applied,
            vertices = snapshot.metrics.vertex_count,
            top_simplices = snapshot.metrics.total_simplices,
            "step"
        );
        Ok(self.history.push(snapshot))
    }

    fn reset(&mut self) -> Result<(), ControllerError> {
        let params = self
            .run
            .as_ref()
            .map(|run| run.params.clone())
            .ok_or(ControllerError::NotInitialized)?;
        self.initialize(params)
    }

    fn state(&self) -> Result<&Snapshot<PachnerMove>, ControllerError> {
        self.history.current()
    }

    fn history(&self) -> &[Snapshot<PachnerMove>] {
        self.history.as_slice()
    }

    fn seek_to_step(&mut self, step: usize) -> Result<&Snapshot<PachnerMove>, ControllerError> {
        self.history.seek(step)
    }

    fn current_step(&self) -> usize {
        self.history.cursor()
    }

    fn is_running(&self) -> bool {
        self.history.is_running()
    }

    fn set_running(&mut self, running: bool) {
        self.history.set_running(running);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::validate_simplicial_complex;

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

    fn params_2d() -> SimplicialGrowthParams {
        SimplicialGrowthParams {
            dimension: Dimension::Two,
            initial_vertices: 3,
            move_probabilities: MoveProbabilities::for_dimension(Dimension::Two),
            ..SimplicialGrowthParams::default()
        }
    }

    #[test]
    fn uninitialized_controller_refuses_to_step() {
        let mut controller = SimplicialGrowthController::seeded(0);
        assert_eq!(controller.step().unwrap_err(), ControllerError::NotInitialized);
        assert_eq!(controller.state().unwrap_err(), ControllerError::NotInitialized);
        assert_eq!(controller.reset().unwrap_err(), ControllerError::NotInitialized);
        assert!(controller.history().is_empty());
    }

    #[test]
    fn initialize_builds_seed_snapshot() {
        let mut controller = SimplicialGrowthController::seeded(0);
        controller.initialize(SimplicialGrowthParams::default()).unwrap();
        let state = controller.state().unwrap();
        assert_eq!(state.step, 0);
        assert_eq!(state.last_move, None);
        assert_eq!(state.metrics.total_simplices, 1);
        assert_eq!(state.metrics.vertex_count, 4);
        assert_eq!(state.move_counts.len(), 4);
        let p = state.geometry.bounds().unwrap();
        let mid = nalgebra::center(&p.0, &p.1);
        approx::assert_relative_eq!(mid.x, 400.0, epsilon = 1e-9);
        approx::assert_relative_eq!(mid.y, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn only_one_to_three_grows_every_step() {
        init_tracing();
        let mut params = params_2d();
        params.move_probabilities = MoveProbabilities::for_dimension(Dimension::Two)
            .with(PachnerMove::TwoToTwo, 0.0)
            .with(PachnerMove::ThreeToOne, 0.0);
        let mut controller = SimplicialGrowthController::seeded(5);
        controller.initialize(params).unwrap();
        for expected in 1..=10 {
            let snapshot = controller.step().unwrap();
            assert_eq!(snapshot.step, expected);
            assert_eq!(snapshot.last_move, Some(PachnerMove::OneToThree));
            assert_eq!(snapshot.metrics.total_simplices, 1 + 2 * expected);
            assert_eq!(snapshot.metrics.curvature, 1);
        }
        let last = controller.state().unwrap();
        assert_eq!(last.move_count(PachnerMove::OneToThree), 10);
        assert!(validate_simplicial_complex(&last.complex).is_valid());
    }

    #[test]
    fn failed_move_falls_back_to_inverse() {
        // 3-1 on the seed triangle has no target; its inverse 1-3 always succeeds.
        let mut params = params_2d();
        params.move_probabilities = MoveProbabilities::for_dimension(Dimension::Two)
            .with(PachnerMove::OneToThree, 0.0)
            .with(PachnerMove::TwoToTwo, 0.0);
        let mut controller = SimplicialGrowthController::seeded(1);
        controller.initialize(params).unwrap();
        let snapshot = controller.step().unwrap();
        assert_eq!(snapshot.last_move, Some(PachnerMove::OneToThree));
    }

    #[test]
    fn failed_step_changes_nothing() {
        init_tracing();
        // 2-2 is its own inverse and the seed triangle has no interior edge.
        let mut params = params_2d();
        params.move_probabilities = MoveProbabilities::for_dimension(Dimension::Two)
            .with(PachnerMove::OneToThree, 0.0)
            .with(PachnerMove::ThreeToOne, 0.0);
        let mut controller = SimplicialGrowthController::seeded(1);
        controller.initialize(params).unwrap();
        let before = controller.complex().unwrap().clone();
        let err = controller.step().unwrap_err();
        assert!(matches!(err, ControllerError::MoveFailed { ref primary, .. } if primary == "2-2"));
        assert_eq!(controller.history().len(), 1);
        assert_eq!(controller.complex().unwrap(), &before);
    }

    #[test]
    fn max_steps_bounds_the_run() {
        let mut params = params_2d();
        params.max_steps = 2;
        params.move_probabilities = MoveProbabilities::default()
            .with(PachnerMove::OneToThree, 1.0);
        let mut controller = SimplicialGrowthController::seeded(3);
        controller.initialize(params).unwrap();
        controller.step().unwrap();
        controller.step().unwrap();
        assert_eq!(
            controller.step().unwrap_err(),
            ControllerError::MaxStepsReached { max_steps: 2 }
        );
    }

    #[test]
    fn seek_is_a_view_and_reset_restarts() {
        let mut params = params_2d();
        params.move_probabilities = MoveProbabilities::default()
            .with(PachnerMove::OneToThree, 1.0);
        let mut controller = SimplicialGrowthController::seeded(11);
        controller.initialize(params).unwrap();
        for _ in 0..3 {
            controller.step().unwrap();
        }
        let first = controller.seek_to_step(1).unwrap().clone();
        assert_eq!(controller.current_step(), 1);
        assert_eq!(controller.state().unwrap(), &first);
        assert_eq!(
            controller.seek_to_step(4).unwrap_err(),
            ControllerError::StepOutOfRange { step: 4, len: 4 }
        );

        // Stepping after a seek continues from the live complex.
        let next = controller.step().unwrap();
        assert_eq!(next.step, 4);
        assert_eq!(next.metrics.total_simplices, 9);
        assert_eq!(controller.current_step(), 4);

        controller.set_running(true);
        controller.reset().unwrap();
        assert!(!controller.is_running());
        assert_eq!(controller.history().len(), 1);
        assert_eq!(controller.state().unwrap().metrics.total_simplices, 1);
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed| {
            let mut controller = SimplicialGrowthController::seeded(seed);
            controller.initialize(SimplicialGrowthParams::default()).unwrap();
            for _ in 0..15 {
                let _ = controller.step();
            }
            controller
                .history()
                .iter()
                .map(|s| s.last_move)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn strip_seed_from_initial_vertices() {
        let mut controller = SimplicialGrowthController::seeded(0);
        controller
            .initialize(SimplicialGrowthParams {
                initial_vertices: 6,
                ..SimplicialGrowthParams::default()
            })
            .unwrap();
        assert_eq!(controller.state().unwrap().metrics.total_simplices, 3);
        assert_eq!(controller.state().unwrap().metrics.curvature, 1);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut controller = SimplicialGrowthController::seeded(0);
        let params = SimplicialGrowthParams {
            growth_rate: -1.0,
            ..SimplicialGrowthParams::default()
        };
        assert!(matches!(
            controller.initialize(params),
            Err(ControllerError::InvalidParameter { name: "growth_rate", .. })
        ));
        assert!(controller.history().is_empty());
    }
}
