//! # pachner
//!
//! A library for evolving 2D and 3D [simplicial complexes](https://en.wikipedia.org/wiki/Simplicial_complex)
//! with [Pachner moves](https://en.wikipedia.org/wiki/Pachner_moves) (bistellar flips) and
//! boundary-growth gluing, in the spirit of dynamical-triangulation simulations.
//!
//! # Features
//!
//! - Typed entity store with canonical-key deduplication of edges and faces
//! - Face→tetrahedra manifold index (at most two tetrahedra per face)
//! - 2D moves (1-3, 2-2, 3-1) and 3D moves (1-4, 2-3, 3-2, 4-1) with exact combinatorial deltas
//! - Boundary growth: glue, tent move, overlap rejection, frozen boundaries
//! - Euler characteristic, boundary operator and a Betti-number estimate
//! - Seedable growth controllers with immutable history and replay
//! - Serialization/Deserialization with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use pachner::prelude::*;
//!
//! let mut complex = SimplicialComplex::initial_triangle();
//! let mut geometry = Geometry::triangle(Point3::new(0.0, 0.0, 0.0), 1.0);
//! let face = complex.face_ids().next().unwrap();
//!
//! let chi_before = complex.euler_characteristic();
//! let info = apply_pachner_move(
//!     &mut complex,
//!     Some(&mut geometry),
//!     PachnerMove::OneToThree,
//!     MoveTarget::Face(face),
//! )
//! .unwrap();
//!
//! assert!(info.new_vertex.is_some());
//! assert_eq!(complex.number_of_faces(), 3);
//! assert_eq!(complex.euler_characteristic(), chi_before);
//! ```
//!
//! # Invariants
//!
//! After every successful operation:
//!
//! - every edge, face and tetrahedron references existing vertices only
//! - faces have 3 distinct vertices and tetrahedra 4
//! - a face is shared by at most two tetrahedra
//! - the Euler characteristic is unchanged by any single Pachner move
//!
//! Every operator checks its preconditions, geometry and the manifold/duplicate constraints
//! of its result *before* mutating, so a failed operator leaves both the complex and the
//! geometry exactly as they were.
//!
//! # Growth Controllers
//!
//! ```rust
//! use pachner::prelude::*;
//!
//! let params = SimplicialGrowthParamsBuilder::default()
//!     .dimension(Dimension::Three)
//!     .max_steps(20_usize)
//!     .build()
//!     .unwrap();
//!
//! let mut controller = SimplicialGrowthController::seeded(7);
//! controller.initialize(params).unwrap();
//!
//! // A step whose move and fallback both fail reports an error and changes nothing.
//! let successes = (0..10).filter(|_| controller.step().is_ok()).count();
//! assert_eq!(controller.history().len(), successes + 1);
//!
//! let seed = controller.seek_to_step(0).unwrap();
//! assert_eq!(seed.metrics.curvature, 1);
//! assert_eq!(controller.state().unwrap().step, 0);
//! ```
//!
//! # Betti Numbers
//!
//! Only b0 is computed exactly. Higher Betti numbers are *estimated* from χ and are not
//! exact homology; see [`topology::homology`].

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the simplicial-complex store and the algorithms that mutate it.
///
/// It includes [`SimplicialComplex`](core::complex::SimplicialComplex), canonical keys, the
/// structural validator, half-edge and tetrahedral adjacency, boundary detection and the
/// Pachner and boundary-growth operators.
pub mod core {
    /// Mutating operators on (complex, geometry) pairs
    pub mod algorithms {
        /// Pachner move dispatch, move kinds and flip errors
        pub mod flips;
        /// 2D moves: 1-3, 2-2, 3-1
        pub mod flips_2d;
        /// 3D moves: 1-4, 2-3, 3-2, 4-1
        pub mod flips_3d;
        /// Boundary growth: glue, tent move, overlap rejection
        pub mod growth;
        pub use flips::*;
        pub use growth::*;
    }
    pub mod adjacency;
    pub mod boundary;
    pub mod builder;
    /// High-performance collection types used by the indices
    pub mod collections;
    pub mod complex;
    pub mod edge;
    pub mod facet;
    pub mod half_edge;
    pub mod simplex;
    pub mod validation;
    // Re-export the `core` modules.
    pub use boundary::*;
    pub use complex::*;
    pub use edge::*;
    pub use facet::*;
    pub use half_edge::*;
    pub use simplex::*;
    pub use validation::*;
}

/// Vertex embeddings, geometric predicates and quality measures.
///
/// Geometry lives in its own aggregate, [`Geometry`](geometry::embedding::Geometry), which
/// maps vertex ids to positions independently of the topology. 2D complexes are embedded with
/// `z = 0`.
pub mod geometry {
    pub mod embedding;
    pub mod predicates;
    /// Areas, volumes and convexity tests for simplices
    pub mod quality;
    pub use embedding::*;
    pub use predicates::*;
    pub use quality::*;
}

/// Topological characteristics: Euler characteristic, chains and Betti-number estimates.
pub mod topology {
    /// Counting and validation of topological invariants
    pub mod characteristics {
        pub mod euler;
        pub mod validation;
        pub use euler::*;
        pub use validation::*;
    }
    pub mod homology;
    pub use characteristics::*;
    pub use homology::*;
}

/// Growth controllers that own a complex, select moves and keep a replayable history.
pub mod simulation {
    pub mod boundary_growth;
    pub mod controller;
    pub mod params;
    pub mod simplicial_growth;
    pub mod snapshot;
    pub use boundary_growth::*;
    pub use controller::*;
    pub use params::*;
    pub use simplicial_growth::*;
    pub use snapshot::*;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        adjacency::*,
        algorithms::{flips::*, growth::*},
        boundary::*,
        builder::*,
        complex::*,
        edge::*,
        facet::*,
        half_edge::*,
        simplex::*,
        validation::*,
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    // Re-export from geometry
    pub use crate::geometry::{embedding::*, predicates::*, quality::*};

    // Re-export from topology
    pub use crate::topology::{
        characteristics::{euler::*, validation::*},
        homology::*,
    };

    // Re-export from simulation
    pub use crate::simulation::*;

    pub use nalgebra::{Point3, Vector3};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
