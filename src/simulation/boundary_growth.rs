//! A controller that grows a complex outward by glue and tent moves.
//!
//! Each step tries a tent with probability `tent_probability` and a glue otherwise; if the
//! chosen move fails the other one is tried. Frozen boundary elements are resolved once on
//! `initialize` and never grown from.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::algorithms::growth::{
    GlueMode, GrowthError, GrowthInfo, GrowthMove, glue_random_boundary, tent_random_vertex,
};
use crate::core::boundary::FrozenBoundary;
use crate::core::builder::SeedBuilder;
use crate::core::complex::SimplicialComplex;
use crate::geometry::embedding::{Geometry, Position};
use crate::simulation::controller::{ControllerError, History, SimulationController};
use crate::simulation::params::{BoundaryGrowthParams, SEED_CENTER, seed_scale};
use crate::simulation::snapshot::Snapshot;

#[derive(Clone, Debug)]
struct Run {
    params: BoundaryGrowthParams,
    complex: SimplicialComplex,
    geometry: Geometry,
    frozen: FrozenBoundary,
    counts: BTreeMap<GrowthMove, usize>,
}

impl Run {
    fn attempt<R: Rng + ?Sized>(
        &mut self,
        kind: GrowthMove,
        rng: &mut R,
    ) -> Result<GrowthInfo, GrowthError> {
        let scale = self.params.growth_scale;
        match kind {
            GrowthMove::Glue => {
                let mode = if self.params.symmetric {
                    GlueMode::Symmetric
                } else {
                    GlueMode::Fixed(scale)
                };
                glue_random_boundary(
                    &mut self.complex,
                    &mut self.geometry,
                    mode,
                    self.params.prevent_overlap,
                    &self.frozen,
                    rng,
                )
            }
            GrowthMove::Tent => {
                tent_random_vertex(&mut self.complex, &mut self.geometry, scale, &self.frozen, rng)
            }
        }
    }
}

/// Grows a complex outward from its boundary.
///
/// # Examples
///
/// ```rust
/// use pachner::prelude::*;
///
/// let params = BoundaryGrowthParamsBuilder::default()
///     .dimension(Dimension::Two)
///     .tent_probability(0.0)
///     .symmetric(true)
///     .build()
///     .unwrap();
/// let mut controller = BoundaryGrowthController::seeded(3);
/// controller.initialize(params).unwrap();
/// let snapshot = controller.step().unwrap();
/// assert_eq!(snapshot.last_move, Some(GrowthMove::Glue));
/// assert_eq!(snapshot.metrics.total_simplices, 2);
/// ```
#[derive(Clone, Debug)]
pub struct BoundaryGrowthController<R = StdRng> {
    rng: R,
    run: Option<Run>,
    history: History<GrowthMove>,
}

impl BoundaryGrowthController<StdRng> {
    /// A controller drawing from a [`StdRng`] seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for BoundaryGrowthController<StdRng> {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> BoundaryGrowthController<R> {
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
    pub fn params(&self) -> Option<&BoundaryGrowthParams> {
        self.run.as_ref().map(|run| &run.params)
    }

    /// Boundary elements protected from growth in the current run.
    #[must_use]
    pub fn frozen_boundary(&self) -> Option<&FrozenBoundary> {
        self.run.as_ref().map(|run| &run.frozen)
    }

    /// The live complex.
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

impl<R: Rng> SimulationController for BoundaryGrowthController<R> {
    type Params = BoundaryGrowthParams;
    type Move = GrowthMove;

    fn initialize(&mut self, params: BoundaryGrowthParams) -> Result<(), ControllerError> {
        params.validate()?;
        let (complex, geometry) = SeedBuilder::new(params.dimension)
            .shape(params.seed)
            .center(Position::from(SEED_CENTER))
            .scale(seed_scale(params.dimension))
            .build();
        let frozen = FrozenBoundary::compute(&params.boundary_constraint, &complex, &geometry);
        let counts = BTreeMap::from([(GrowthMove::Glue, 0), (GrowthMove::Tent, 0)]);
        self.history.restart(Snapshot::capture(
            0,
            &complex,
            &geometry,
            None,
            counts.clone(),
        ));
        tracing::debug!(
            dimension = %params.dimension,
            frozen = frozen.len(),
            "initialized boundary growth"
        );
        self.run = Some(Run {
            params,
            complex,
            geometry,
            frozen,
            counts,
        });
        Ok(())
    }

    fn step(&mut self) -> Result<&Snapshot<GrowthMove>, ControllerError> {
        let run = self.run.as_mut().ok_or(ControllerError::NotInitialized)?;
        let max_steps = run.params.max_steps;
        if self.history.steps_taken() >= max_steps {
            return Err(ControllerError::MaxStepsReached { max_steps });
        }

        let primary = if self.rng.random::<f64>() < run.params.tent_probability {
            GrowthMove::Tent
        } else {
            GrowthMove::Glue
        };
        let applied = match run.attempt(primary, &mut self.rng) {
            Ok(_) => primary,
            Err(first) => {
                let fallback = primary.other();
                tracing::debug!(
                    move_kind = %primary,
                    %fallback,
                    reason = %first,
                    "growth move failed, trying the other"
                );
                match run.attempt(fallback, &mut self.rng) {
                    Ok(_) => fallback,
                    Err(second) => {
                        tracing::warn!(
                            move_kind = %primary,
                            %fallback,
                            reason = %second,
                            "step failed"
                        );
                        return Err(ControllerError::MoveFailed {
                            primary: primary.to_string(),
                            fallback: fallback.to_string(),
                            reason: second.to_string(),
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
            boundary = snapshot.metrics.boundary_size,
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

    fn state(&self) -> Result<&Snapshot<GrowthMove>, ControllerError> {
        self.history.current()
    }

    fn history(&self) -> &[Snapshot<GrowthMove>] {
        self.history.as_slice()
    }

    fn seek_to_step(&mut self, step: usize) -> Result<&Snapshot<GrowthMove>, ControllerError> {
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
