//! Integration tests for the growth controllers.
//!
//! ## Test Coverage
//!
//! - History bookkeeping: one snapshot per successful step, immutable past snapshots
//! - Reproducibility of seeded runs
//! - Seeking, continuing after a seek, and resetting
//! - Move-count and metric consistency across both controllers
//! - Both controllers driven through the shared trait

use pachner::prelude::*;

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

/// Steps `controller` `n` times and returns the number of successful steps.
fn run<C: SimulationController>(controller: &mut C, n: usize) -> usize {
    (0..n).filter(|_| controller.step().is_ok()).count()
}

fn pachner_2d() -> SimplicialGrowthParams {
    SimplicialGrowthParamsBuilder::default()
        .dimension(Dimension::Two)
        .move_probabilities(MoveProbabilities::for_dimension(Dimension::Two))
        .build()
        .unwrap()
}

// =============================================================================
// SIMPLICIAL GROWTH
// =============================================================================

#[test]
fn test_history_records_every_successful_step() {
    init_tracing();
    let mut controller = SimplicialGrowthController::seeded(7);
    controller.initialize(pachner_2d()).unwrap();
    let successes = run(&mut controller, 30);

    let history = controller.history();
    assert_eq!(history.len(), successes + 1);
    for (i, snapshot) in history.iter().enumerate() {
        assert_eq!(snapshot.step, i);
        assert_eq!(snapshot.metrics.curvature, 1);
        assert_eq!(snapshot.metrics.dimension, Dimension::Two);
        assert!(validate_simplicial_complex(&snapshot.complex).is_valid());
        let counted: usize = PachnerMove::moves_for(Dimension::Two)
            .iter()
            .map(|&kind| snapshot.move_count(kind))
            .sum();
        assert_eq!(counted, i);
        assert_eq!(snapshot.last_move.is_some(), i > 0);
    }
}

#[test]
fn test_vertex_count_follows_applied_moves() {
    let mut controller = SimplicialGrowthController::seeded(13);
    controller.initialize(pachner_2d()).unwrap();
    run(&mut controller, 25);
    let state = controller.state().unwrap();
    let grown = state.move_count(PachnerMove::OneToThree);
    let shrunk = state.move_count(PachnerMove::ThreeToOne);
    assert_eq!(state.metrics.vertex_count, 3 + grown - shrunk);
    assert_eq!(state.metrics.total_simplices, 1 + 2 * grown - 2 * shrunk);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let params = SimplicialGrowthParams::default();
    let mut first = SimplicialGrowthController::seeded(2024);
    let mut second = SimplicialGrowthController::seeded(2024);
    first.initialize(params.clone()).unwrap();
    second.initialize(params).unwrap();
    run(&mut first, 20);
    run(&mut second, 20);
    assert_eq!(first.history(), second.history());
}

#[test]
fn test_three_dimensional_run_keeps_chi() {
    init_tracing();
    let mut controller = SimplicialGrowthController::seeded(3);
    controller.initialize(SimplicialGrowthParams::default()).unwrap();
    run(&mut controller, 30);
    for snapshot in controller.history() {
        assert_eq!(snapshot.metrics.curvature, 1);
        assert!(
            snapshot
                .complex
                .face_to_tetrahedra()
                .all(|(_, tets)| tets.len() <= 2)
        );
    }
    let complex = controller.complex().unwrap();
    assert_eq!(validate_euler(complex).chi, 1);
}

#[test]
fn test_seek_then_continue_appends_from_live_state() {
    let mut controller = SimplicialGrowthController::seeded(19);
    controller.initialize(pachner_2d()).unwrap();
    let successes = run(&mut controller, 10);
    assert!(successes >= 2);
    let last = controller.state().unwrap().clone();

    let early = controller.seek_to_step(1).unwrap().clone();
    assert_eq!(early.step, 1);
    assert_eq!(controller.current_step(), 1);
    // The live complex is not rewound.
    assert_eq!(controller.complex(), Some(&last.complex));

    if let Ok(next) = controller.step() {
        assert_eq!(next.step, successes + 1);
        assert_eq!(controller.current_step(), successes + 1);
    }
    // Past snapshots are untouched.
    assert_eq!(controller.history()[1], early);

    assert!(matches!(
        controller.seek_to_step(controller.history().len()),
        Err(ControllerError::StepOutOfRange { .. })
    ));
}

#[test]
fn test_max_steps_bounds_the_run() {
    let params = SimplicialGrowthParams {
        max_steps: 3,
        ..pachner_2d()
    };
    let mut controller = SimplicialGrowthController::seeded(1);
    controller.initialize(params).unwrap();
    for _ in 0..50 {
        if let Err(ControllerError::MaxStepsReached { max_steps }) = controller.step() {
            assert_eq!(max_steps, 3);
            break;
        }
    }
    assert_eq!(controller.history().len(), 4);
    assert!(matches!(
        controller.step(),
        Err(ControllerError::MaxStepsReached { max_steps: 3 })
    ));
}

#[test]
fn test_reset_returns_to_the_seed() {
    let mut controller = SimplicialGrowthController::seeded(5);
    controller.initialize(pachner_2d()).unwrap();
    let seed = controller.state().unwrap().clone();
    run(&mut controller, 5);
    controller.set_running(true);
    controller.reset().unwrap();
    assert_eq!(controller.history().len(), 1);
    assert_eq!(controller.current_step(), 0);
    assert!(!controller.is_running());
    assert_eq!(controller.state().unwrap().complex, seed.complex);
    assert_eq!(controller.state().unwrap().geometry, seed.geometry);
}

#[test]
fn test_uninitialized_controllers_refuse_to_step() {
    let mut pachner = SimplicialGrowthController::seeded(0);
    let mut boundary = BoundaryGrowthController::seeded(0);
    assert_eq!(pachner.step().unwrap_err(), ControllerError::NotInitialized);
    assert_eq!(boundary.step().unwrap_err(), ControllerError::NotInitialized);
    assert_eq!(pachner.reset().unwrap_err(), ControllerError::NotInitialized);
    assert!(boundary.state().is_err());
    assert!(pachner.history().is_empty());
}

// =============================================================================
// BOUNDARY GROWTH
// =============================================================================

#[test]
fn test_boundary_growth_adds_one_vertex_per_step() {
    init_tracing();
    let params = BoundaryGrowthParamsBuilder::default()
        .dimension(Dimension::Two)
        .symmetric(true)
        .build()
        .unwrap();
    let mut controller = BoundaryGrowthController::seeded(77);
    controller.initialize(params).unwrap();
    run(&mut controller, 20);

    for (i, snapshot) in controller.history().iter().enumerate() {
        assert_eq!(snapshot.metrics.vertex_count, 3 + i);
        assert_eq!(snapshot.metrics.curvature, 1);
        assert_eq!(
            snapshot.move_count(GrowthMove::Glue) + snapshot.move_count(GrowthMove::Tent),
            i
        );
    }
    let volumes: Vec<f64> = controller
        .history()
        .iter()
        .map(|s| s.metrics.volume)
        .collect();
    assert!(volumes.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_boundary_growth_in_3d_with_frozen_base() {
    init_tracing();
    let params = BoundaryGrowthParams {
        dimension: Dimension::Three,
        seed: SeedShape::Strip(3),
        boundary_constraint: BoundaryConstraint::BottomAndSides,
        ..BoundaryGrowthParams::default()
    };
    let mut controller = BoundaryGrowthController::seeded(6);
    controller.initialize(params).unwrap();
    let frozen: Vec<BoundaryElement> = controller.frozen_boundary().unwrap().iter().collect();
    run(&mut controller, 15);

    let complex = controller.complex().unwrap();
    for &element in &frozen {
        assert!(complex.is_boundary(element));
    }
    assert!(validate_simplicial_complex(complex).is_valid());
    assert_eq!(complex.euler_characteristic(), 1);
}

#[test]
fn test_boundary_growth_params_from_json() {
    let json = r#"{
        "dimension": "Two",
        "seed": "Single",
        "growth_scale": 25.0,
        "tent_probability": 0.0,
        "prevent_overlap": false,
        "symmetric": false,
        "boundary_constraint": "None",
        "max_steps": 2
    }"#;
    let params: BoundaryGrowthParams = serde_json::from_str(json).unwrap();
    let mut controller = BoundaryGrowthController::seeded(9);
    controller.initialize(params).unwrap();
    assert!(controller.step().is_ok());
    assert!(controller.step().is_ok());
    assert!(matches!(
        controller.step(),
        Err(ControllerError::MaxStepsReached { max_steps: 2 })
    ));
    assert_eq!(controller.state().unwrap().move_count(GrowthMove::Glue), 2);
}
