//! Seed complexes and a fluent builder pairing them with geometry.
//!
//! Growth runs start from a small seed: a single triangle or tetrahedron, or a strip of them.
//! Strips give the complex an extended boundary, which suits tent moves.
//!
//! | Seed | V | E | F | T |
//! |---|---|---|---|---|
//! | [`SimplicialComplex::initial_triangle`] | 3 | 3 | 1 | - |
//! | [`SimplicialComplex::triangle_strip`]`(n)` | n+2 | 2n+1 | n | - |
//! | [`SimplicialComplex::initial_tetrahedron`] | 4 | 6 | 4 | 1 |
//! | [`SimplicialComplex::tetrahedron_strip`]`(n)` | n+3 | 3n+3 | 3n+1 | n |
//!
//! # Examples
//!
//! ```rust
//! use pachner::core::builder::SeedBuilder;
//! use pachner::core::simplex::Dimension;
//!
//! let (complex, geometry) = SeedBuilder::new(Dimension::Two).strip(4).scale(10.0).build();
//! assert_eq!(complex.number_of_faces(), 4);
//! assert_eq!(geometry.len(), complex.number_of_vertices());
//! ```

use crate::core::complex::SimplicialComplex;
use crate::core::simplex::{Dimension, VertexId};
use crate::geometry::embedding::{Geometry, Position};
use serde::{Deserialize, Serialize};

/// Shape of a seed complex.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedShape {
    /// One triangle (2D) or one tetrahedron (3D).
    #[default]
    Single,
    /// A strip of `n` triangles or tetrahedra. Lengths below 1 are clamped to 1.
    Strip(usize),
}

impl SimplicialComplex {
    /// A single triangle on vertices 0, 1, 2 with edges `01`, `12`, `20`.
    #[must_use]
    pub fn initial_triangle() -> Self {
        let mut complex = Self::new(Dimension::Two);
        let [a, b, c] = [(); 3].map(|()| complex.add_vertex());
        complex.seed_edge(a, b);
        complex.seed_edge(b, c);
        complex.seed_edge(c, a);
        complex.seed_face(a, b, c);
        complex.finish_mutation();
        complex
    }

    /// A zig-zag strip of `n` triangles.
    ///
    /// Vertex 0 is bottom-left and vertex 1 top-left; each new triangle adds one vertex,
    /// alternating between the bottom and top rows.
    #[must_use]
    pub fn triangle_strip(n: usize) -> Self {
        let n = n.max(1);
        let mut complex = Self::new(Dimension::Two);
        let mut bottom = complex.add_vertex();
        let mut top = complex.add_vertex();
        complex.seed_edge(bottom, top);

        for i in 0..n {
            let new = complex.add_vertex();
            complex.seed_edge(top, new);
            complex.seed_edge(bottom, new);
            complex.seed_face(bottom, top, new);
            if i % 2 == 0 {
                bottom = new;
            } else {
                top = new;
            }
        }
        complex.finish_mutation();
        tracing::debug!(
            triangles = n,
            vertices = complex.number_of_vertices(),
            "built triangle strip"
        );
        complex
    }

    /// A single tetrahedron on vertices 0..=3 with all 6 edges and 4 faces.
    #[must_use]
    pub fn initial_tetrahedron() -> Self {
        Self::tetrahedron_strip(1)
    }

    /// A chain of `n` tetrahedra, each glued onto the previous one's front face.
    ///
    /// The first tetrahedron is `(0,1,2,3)` with front face `(1,2,3)`. Each new tetrahedron
    /// `(a,b,c,new)` is glued on front face `(a,b,c)`, and the front becomes `(b,c,new)`.
    #[must_use]
    pub fn tetrahedron_strip(n: usize) -> Self {
        let n = n.max(1);
        let mut complex = Self::new(Dimension::Three);
        let [v0, v1, v2, v3] = [(); 4].map(|()| complex.add_vertex());
        add_full_tetrahedron(&mut complex, [v0, v1, v2, v3]);

        let mut front = [v1, v2, v3];
        for _ in 1..n {
            let new = complex.add_vertex();
            let [a, b, c] = front;
            add_full_tetrahedron(&mut complex, [a, b, c, new]);
            front = [b, c, new];
        }
        if n > 1 {
            tracing::debug!(
                tetrahedra = n,
                vertices = complex.number_of_vertices(),
                "built tetrahedron strip"
            );
        }
        complex
    }
}

/// Registers a tetrahedron with all of its edges and faces.
fn add_full_tetrahedron(complex: &mut SimplicialComplex, vertices: [VertexId; 4]) {
    let [a, b, c, d] = vertices;
    for (x, y) in [(a, b), (a, c), (a, d), (b, c), (b, d), (c, d)] {
        complex.seed_edge(x, y);
    }
    for [x, y, z] in [[a, b, c], [a, b, d], [a, c, d], [b, c, d]] {
        complex.seed_face(x, y, z);
    }
    complex.seed_tetrahedron(vertices);
}

/// Fluent builder for a seed complex and its geometry.
///
/// Defaults: [`SeedShape::Single`], centre at the origin, scale 1.
#[derive(Clone, Debug)]
pub struct SeedBuilder {
    dimension: Dimension,
    shape: SeedShape,
    center: Position,
    scale: f64,
}

impl SeedBuilder {
    /// Starts a builder for the given dimension.
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            shape: SeedShape::Single,
            center: Position::origin(),
            scale: 1.0,
        }
    }

    /// Sets the seed shape.
    #[must_use]
    pub const fn shape(mut self, shape: SeedShape) -> Self {
        self.shape = shape;
        self
    }

    /// Shorthand for `shape(SeedShape::Strip(n))`.
    #[must_use]
    pub const fn strip(self, n: usize) -> Self {
        self.shape(SeedShape::Strip(n))
    }

    /// Sets the centre of the seed geometry.
    #[must_use]
    pub const fn center(mut self, center: Position) -> Self {
        self.center = center;
        self
    }

    /// Sets the size of the seed geometry: the circumradius of a single triangle, the side
    /// of strip triangles, or the cube-corner scale of tetrahedra.
    #[must_use]
    pub const fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Builds the complex and its geometry.
    #[must_use]
    pub fn build(&self) -> (SimplicialComplex, Geometry) {
        match (self.dimension, self.shape) {
            (Dimension::Two, SeedShape::Single) => (
                SimplicialComplex::initial_triangle(),
                Geometry::triangle(self.center, self.scale),
            ),
            (Dimension::Two, SeedShape::Strip(n)) => (
                SimplicialComplex::triangle_strip(n),
                Geometry::triangle_strip(n, self.center, self.scale),
            ),
            (Dimension::Three, SeedShape::Single) => (
                SimplicialComplex::initial_tetrahedron(),
                Geometry::tetrahedron(self.center, self.scale),
            ),
            (Dimension::Three, SeedShape::Strip(n)) => (
                SimplicialComplex::tetrahedron_strip(n),
                Geometry::tetrahedron_strip(n, self.center, self.scale),
            ),
        }
    }
}
