//! Controller parameters.
//!
//! Both parameter structs are plain data with `serde` support, so collaborators can load them
//! from JSON, and a `derive_builder` builder whose unset fields fall back to [`Default`].
//! Values are checked by `validate`, which the controllers call on `initialize`.

use serde::{Deserialize, Serialize};

use crate::core::algorithms::flips::PachnerMove;
use crate::core::boundary::BoundaryConstraint;
use crate::core::builder::SeedShape;
use crate::core::simplex::Dimension;
use crate::simulation::controller::ControllerError;

/// Centre of every seed geometry.
pub const SEED_CENTER: [f64; 3] = [400.0, 300.0, 0.0];

/// Seed size: triangle circumradius (2D) or tetrahedron cube scale (3D).
#[must_use]
pub const fn seed_scale(dimension: Dimension) -> f64 {
    match dimension {
        Dimension::Two => 120.0,
        Dimension::Three => 80.0,
    }
}

/// Relative weight of each Pachner move. Only the weights of the complex's dimension are used.
///
/// Weights must be finite and non-negative; they need not sum to one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveProbabilities {
    /// Weight of the 1-3 move.
    #[serde(rename = "1-3")]
    pub one_to_three: f64,
    /// Weight of the 2-2 move.
    #[serde(rename = "2-2")]
    pub two_to_two: f64,
    /// Weight of the 3-1 move.
    #[serde(rename = "3-1")]
    pub three_to_one: f64,
    /// Weight of the 1-4 move.
    #[serde(rename = "1-4")]
    pub one_to_four: f64,
    /// Weight of the 2-3 move.
    #[serde(rename = "2-3")]
    pub two_to_three: f64,
    /// Weight of the 3-2 move.
    #[serde(rename = "3-2")]
    pub three_to_two: f64,
    /// Weight of the 4-1 move.
    #[serde(rename = "4-1")]
    pub four_to_one: f64,
}

impl MoveProbabilities {
    /// Default weights for `dimension`: 0.5/0.3/0.2 for 1-3/2-2/3-1 in 2D, and
    /// 0.4/0.3/0.2/0.1 for 1-4/2-3/3-2/4-1 in 3D. The other dimension's weights are zero.
    #[must_use]
    pub const fn for_dimension(dimension: Dimension) -> Self {
        let zero = Self {
            one_to_three: 0.0,
            two_to_two: 0.0,
            three_to_one: 0.0,
            one_to_four: 0.0,
            two_to_three: 0.0,
            three_to_two: 0.0,
            four_to_one: 0.0,
        };
        match dimension {
            Dimension::Two => Self {
                one_to_three: 0.5,
                two_to_two: 0.3,
                three_to_one: 0.2,
                ..zero
            },
            Dimension::Three => Self {
                one_to_four: 0.4,
                two_to_three: 0.3,
                three_to_two: 0.2,
                four_to_one: 0.1,
                ..zero
            },
        }
    }

    /// Weight of `kind`.
    #[must_use]
    pub const fn weight(&self, kind: PachnerMove) -> f64 {
        match kind {
            PachnerMove::OneToThree => self.one_to_three,
            PachnerMove::TwoToTwo => self.two_to_two,
            PachnerMove::ThreeToOne => self.three_to_one,
            PachnerMove::OneToFour => self.one_to_four,
            PachnerMove::TwoToThree => self.two_to_three,
            PachnerMove::ThreeToTwo => self.three_to_two,
            PachnerMove::FourToOne => self.four_to_one,
        }
    }

    /// Returns a copy with the weight of `kind` replaced.
    #[must_use]
    pub const fn with(mut self, kind: PachnerMove, weight: f64) -> Self {
        let slot = match kind {
            PachnerMove::OneToThree => &mut self.one_to_three,
            PachnerMove::TwoToTwo => &mut self.two_to_two,
            PachnerMove::ThreeToOne => &mut self.three_to_one,
            PachnerMove::OneToFour => &mut self.one_to_four,
            PachnerMove::TwoToThree => &mut self.two_to_three,
            PachnerMove::ThreeToTwo => &mut self.three_to_two,
            PachnerMove::FourToOne => &mut self.four_to_one,
        };
        *slot = weight;
        self
    }

    /// Sum of the weights of the moves for `dimension`.
    #[must_use]
    pub fn total(&self, dimension: Dimension) -> f64 {
        PachnerMove::moves_for(dimension)
            .iter()
            .map(|&k| self.weight(k))
            .sum()
    }

    /// Checks that every weight is finite and non-negative, and that `dimension` has at least
    /// one positive weight.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidParameter`] naming the offending move.
    pub fn validate(&self, dimension: Dimension) -> Result<(), ControllerError> {
        for &kind in &PachnerMove::ALL {
            let w = self.weight(kind);
            if !w.is_finite() || w < 0.0 {
                return Err(ControllerError::InvalidParameter {
                    name: "move_probabilities",
                    reason: format!("weight of {kind} is {w}; weights must be finite and >= 0"),
                });
            }
        }
        if self.total(dimension) <= 0.0 {
            return Err(ControllerError::InvalidParameter {
                name: "move_probabilities",
                reason: format!("no {dimension} move has a positive weight"),
            });
        }
        Ok(())
    }
}

impl Default for MoveProbabilities {
    fn default() -> Self {
        Self::for_dimension(Dimension::Three)
    }
}

/// Parameters of a [`SimplicialGrowthController`](super::SimplicialGrowthController).
///
/// # Examples
///
/// ```rust
/// use pachner::core::simplex::Dimension;
/// use pachner::simulation::{MoveProbabilities, SimplicialGrowthParamsBuilder};
///
/// let params = SimplicialGrowthParamsBuilder::default()
///     .dimension(Dimension::Two)
///     .initial_vertices(3_usize)
///     .move_probabilities(MoveProbabilities::for_dimension(Dimension::Two))
///     .build()
///     .unwrap();
/// assert_eq!(params.max_steps, 100);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(default)]
pub struct SimplicialGrowthParams {
    /// Dimension of the complex.
    pub dimension: Dimension,
    /// Vertex count of the seed. Up to `d + 1` gives a single simplex; more gives a strip of
    /// `initial_vertices - d` simplices.
    pub initial_vertices: usize,
    /// Maximum number of successful steps.
    pub max_steps: usize,
    /// Relative weight of each move.
    pub move_probabilities: MoveProbabilities,
    /// Growth rate passed through to collaborators. It does not affect move selection.
    pub growth_rate: f64,
}

impl Default for SimplicialGrowthParams {
    fn default() -> Self {
        Self {
            dimension: Dimension::Three,
            initial_vertices: 4,
            max_steps: 100,
            move_probabilities: MoveProbabilities::default(),
            growth_rate: 1.0,
        }
    }
}

impl SimplicialGrowthParams {
    /// Seed shape selected by `initial_vertices`.
    #[must_use]
    pub const fn seed_shape(&self) -> SeedShape {
        let d = self.dimension.as_usize();
        if self.initial_vertices <= d + 1 {
            SeedShape::Single
        } else {
            SeedShape::Strip(self.initial_vertices - d)
        }
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidParameter`] for invalid weights or a negative or
    /// non-finite growth rate.
    pub fn validate(&self) -> Result<(), ControllerError> {
        self.move_probabilities.validate(self.dimension)?;
        if !self.growth_rate.is_finite() || self.growth_rate < 0.0 {
            return Err(ControllerError::InvalidParameter {
                name: "growth_rate",
                reason: format!("{} is not a finite value >= 0", self.growth_rate),
            });
        }
        Ok(())
    }
}

/// Parameters of a [`BoundaryGrowthController`](super::BoundaryGrowthController).
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(default)]
pub struct BoundaryGrowthParams {
    /// Dimension of the complex.
    pub dimension: Dimension,
    /// Seed topology: a single simplex or a strip.
    pub seed: SeedShape,
    /// Apex offset of glue (unless `symmetric`) and tent moves.
    pub growth_scale: f64,
    /// Probability that a step tries a tent before a glue.
    pub tent_probability: f64,
    /// Reject glues that would overlap existing simplices.
    pub prevent_overlap: bool,
    /// Place glued apexes so the new simplex is equilateral or regular.
    pub symmetric: bool,
    /// Boundary elements protected from growth.
    pub boundary_constraint: BoundaryConstraint,
    /// Maximum number of successful steps.
    pub max_steps: usize,
}

impl Default for BoundaryGrowthParams {
    fn default() -> Self {
        Self {
            dimension: Dimension::Two,
            seed: SeedShape::Single,
            growth_scale: 50.0,
            tent_probability: 0.3,
            prevent_overlap: true,
            symmetric: false,
            boundary_constraint: BoundaryConstraint::None,
            max_steps: 100,
        }
    }
}

impl BoundaryGrowthParams {
    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidParameter`] for a non-positive growth scale, a tent
    /// probability outside `[0, 1]`, or a strip of length 0.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !self.growth_scale.is_finite() || self.growth_scale <= 0.0 {
            return Err(ControllerError::InvalidParameter {
                name: "growth_scale",
                reason: format!("{} is not a finite value > 0", self.growth_scale),
            });
        }
        if !(0.0..=1.0).contains(&self.tent_probability) {
            return Err(ControllerError::InvalidParameter {
                name: "tent_probability",
                reason: format!("{} is outside [0, 1]", self.tent_probability),
            });
        }
        if self.seed == SeedShape::Strip(0) {
            return Err(ControllerError::InvalidParameter {
                name: "seed",
                reason: "strip length must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_dimension() {
        let two = MoveProbabilities::for_dimension(Dimension::Two);
        approx::assert_relative_eq!(two.total(Dimension::Two), 1.0);
        approx::assert_relative_eq!(two.total(Dimension::Three), 0.0);
        assert!(two.validate(Dimension::Two).is_ok());
        assert!(two.validate(Dimension::Three).is_err());

        let three = MoveProbabilities::default();
        approx::assert_relative_eq!(three.weight(PachnerMove::OneToFour), 0.4);
        approx::assert_relative_eq!(three.total(Dimension::Three), 1.0);
    }

    #[test]
    fn negative_and_nan_weights_are_rejected() {
        let bad = MoveProbabilities::default().with(PachnerMove::TwoToTwo, -0.1);
        assert!(matches!(
            bad.validate(Dimension::Three),
            Err(ControllerError::InvalidParameter { name: "move_probabilities", .. })
        ));
        let nan = MoveProbabilities::default().with(PachnerMove::OneToFour, f64::NAN);
        assert!(nan.validate(Dimension::Three).is_err());
    }

    #[test]
    fn seed_shape_follows_initial_vertices() {
        let mut params = SimplicialGrowthParams::default();
        assert_eq!(params.seed_shape(), SeedShape::Single);
        params.initial_vertices = 7;
        assert_eq!(params.seed_shape(), SeedShape::Strip(4));
        params.dimension = Dimension::Two;
        params.initial_vertices = 0;
        assert_eq!(params.seed_shape(), SeedShape::Single);
    }

    #[test]
    fn builder_falls_back_to_defaults() {
        let params = BoundaryGrowthParamsBuilder::default()
            .dimension(Dimension::Three)
            .tent_probability(0.5)
            .build()
            .unwrap();
        assert_eq!(params.dimension, Dimension::Three);
        assert!(params.prevent_overlap);
        approx::assert_relative_eq!(params.growth_scale, 50.0);
    }

    #[test]
    fn boundary_params_are_checked() {
        let mut params = BoundaryGrowthParams::default();
        assert!(params.validate().is_ok());
        params.tent_probability = 1.5;
        assert!(params.validate().is_err());
        params.tent_probability = 0.0;
        params.growth_scale = 0.0;
        assert!(params.validate().is_err());
        params.growth_scale = 1.0;
        params.seed = SeedShape::Strip(0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn params_load_from_json() {
        let json = r#"{
            "dimension": "Two",
            "initial_vertices": 3,
            "max_steps": 10,
            "move_probabilities": {
                "1-3": 0.5, "2-2": 0.3, "3-1": 0.2,
                "1-4": 0.0, "2-3": 0.0, "3-2": 0.0, "4-1": 0.0
            },
            "growth_rate": 1.0
        }"#;
        let params: SimplicialGrowthParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.dimension, Dimension::Two);
        assert!(params.validate().is_ok());
    }
}
