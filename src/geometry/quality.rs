//! Geometric measures of simplices.
//!
//! Areas and volumes are unsigned. The convexity test works in the `xy` plane, which is
//! where 2D complexes live.

use crate::core::complex::SimplicialComplex;
use crate::core::simplex::Dimension;
use crate::geometry::embedding::{Geometry, Position};
use crate::geometry::predicates::{Orientation, orientation_2d};

/// Centroid (vertex mean) of a set of points. Returns the origin for an empty slice.
#[must_use]
pub fn centroid(points: &[Position]) -> Position {
    if points.is_empty() {
        return Position::origin();
    }
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Position::from(sum / points.len() as f64)
}

/// Area of the triangle `abc`.
#[must_use]
pub fn triangle_area(a: &Position, b: &Position, c: &Position) -> f64 {
    (b - a).cross(&(c - a)).norm() * 0.5
}

/// Volume of the tetrahedron `abcd`.
///
/// # Examples
///
/// ```rust
/// use pachner::geometry::quality::tetrahedron_volume;
/// use nalgebra::Point3;
///
/// let v = tetrahedron_volume(
///     &Point3::new(0.0, 0.0, 0.0),
///     &Point3::new(1.0, 0.0, 0.0),
///     &Point3::new(0.0, 1.0, 0.0),
///     &Point3::new(0.0, 0.0, 1.0),
/// );
/// assert!((v - 1.0 / 6.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn tetrahedron_volume(a: &Position, b: &Position, c: &Position, d: &Position) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a))).abs() / 6.0
}

/// Returns `true` if the quadrilateral `abcd` (in boundary order) is strictly convex.
///
/// The turns at all four corners must share one non-degenerate [`Orientation`].
#[must_use]
pub fn is_strictly_convex_quadrilateral(
    a: &Position,
    b: &Position,
    c: &Position,
    d: &Position,
) -> bool {
    let turns = [
        orientation_2d(a, b, c),
        orientation_2d(b, c, d),
        orientation_2d(c, d, a),
        orientation_2d(d, a, b),
    ];
    turns.iter().all(|&t| t == Orientation::Positive)
        || turns.iter().all(|&t| t == Orientation::Negative)
}

/// Total measure of the top simplices: face area in 2D, tetrahedron volume in 3D.
///
/// Simplices with a vertex lacking a position contribute nothing.
#[must_use]
pub fn total_measure(complex: &SimplicialComplex, geometry: &Geometry) -> f64 {
    match complex.dimension() {
        Dimension::Two => complex
            .faces()
            .filter_map(|f| geometry.require_all(f.vertices()).ok())
            .map(|[a, b, c]| triangle_area(&a, &b, &c))
            .sum(),
        Dimension::Three => complex
            .tetrahedra()
            .filter_map(|t| geometry.require_all(t.vertices()).ok())
            .map(|[a, b, c, d]| tetrahedron_volume(&a, &b, &c, &d))
            .sum(),
    }
}

/// Mean edge length of a simplex given by its corner positions.
#[must_use]
pub fn mean_edge_length(points: &[Position]) -> f64 {
    let mut total = 0.0;
    let mut count = 0_usize;
    for (i, p) in points.iter().enumerate() {
        for q in &points[i + 1..] {
            total += (q - p).norm();
            count += 1;
        }
    }
    if count == 0 { 0.0 } else { total / count as f64 }
}
