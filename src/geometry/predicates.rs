//! Planar predicates used by the 2D overlap test and the 2-2 convexity guard.
//!
//! All predicates read the `x` and `y` coordinates only. Signs are classified by
//! [`orientation_2d`], which treats a determinant within a magnitude-scaled tolerance of zero
//! as degenerate. This is a floating-point filter, not exact arithmetic: near-collinear
//! configurations resolve to "touching", so a crossing thinner than the tolerance is missed.

use std::fmt;

use crate::geometry::embedding::Position;

/// Absolute floor of the orientation tolerance.
pub const ORIENTATION_BASE_TOLERANCE: f64 = 1e-15;

/// Tolerance per unit of operand magnitude in [`orientation_2d`].
pub const ORIENTATION_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Sign of a planar turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Clockwise.
    Negative,
    /// Collinear within tolerance.
    Degenerate,
    /// Counter-clockwise.
    Positive,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Negative => "negative",
            Self::Degenerate => "degenerate",
            Self::Positive => "positive",
        })
    }
}

impl Orientation {
    /// Returns `true` if both turns are non-degenerate and of opposite sign.
    #[must_use]
    pub fn strictly_opposes(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Positive, Self::Negative) | (Self::Negative, Self::Positive)
        )
    }
}

/// Twice the signed area of the triangle `abc` in the `xy` plane.
///
/// Positive for a counter-clockwise turn, negative for clockwise, zero when collinear.
///
/// # Examples
///
/// ```rust
/// use pachner::geometry::predicates::orient2d;
/// use nalgebra::Point3;
///
/// let a = Point3::new(0.0, 0.0, 0.0);
/// let b = Point3::new(1.0, 0.0, 0.0);
/// let c = Point3::new(0.0, 1.0, 0.0);
/// assert!(orient2d(&a, &b, &c) > 0.0);
/// assert!(orient2d(&a, &c, &b) < 0.0);
/// ```
#[must_use]
pub fn orient2d(a: &Position, b: &Position, c: &Position) -> f64 {
    (b.x - a.x).mul_add(c.y - a.y, -((b.y - a.y) * (c.x - a.x)))
}

/// Classifies the turn `abc` with a tolerance scaled by the magnitude of the two products
/// that make up [`orient2d`].
///
/// # Examples
///
/// ```rust
/// use pachner::geometry::predicates::{Orientation, orientation_2d};
/// use nalgebra::Point3;
///
/// let a = Point3::new(0.0, 0.0, 0.0);
/// let b = Point3::new(1.0, 0.0, 0.0);
/// assert_eq!(orientation_2d(&a, &b, &Point3::new(0.0, 1.0, 0.0)), Orientation::Positive);
/// assert_eq!(orientation_2d(&a, &b, &Point3::new(0.5, 1e-20, 0.0)), Orientation::Degenerate);
/// ```
#[must_use]
pub fn orientation_2d(a: &Position, b: &Position, c: &Position) -> Orientation {
    let det = orient2d(a, b, c);
    let magnitude = ((b.x - a.x) * (c.y - a.y)).abs() + ((b.y - a.y) * (c.x - a.x)).abs();
    let tolerance = ORIENTATION_RELATIVE_TOLERANCE.mul_add(magnitude, ORIENTATION_BASE_TOLERANCE);
    if det > tolerance {
        Orientation::Positive
    } else if det < -tolerance {
        Orientation::Negative
    } else {
        Orientation::Degenerate
    }
}

/// Returns `true` if segments `p1p2` and `q1q2` cross at a single point interior to both.
///
/// Touching at an endpoint, collinear overlap and shared endpoints are not proper
/// intersections, nor is any crossing whose orientation is [`Orientation::Degenerate`].
#[must_use]
pub fn segments_properly_intersect(
    p1: &Position,
    p2: &Position,
    q1: &Position,
    q2: &Position,
) -> bool {
    orientation_2d(q1, q2, p1).strictly_opposes(orientation_2d(q1, q2, p2))
        && orientation_2d(p1, p2, q1).strictly_opposes(orientation_2d(p1, p2, q2))
}

/// Returns `true` if `p` lies strictly inside the triangle `abc` (either orientation).
#[must_use]
pub fn point_in_triangle(p: &Position, a: &Position, b: &Position, c: &Position) -> bool {
    let turns = [
        orientation_2d(a, b, p),
        orientation_2d(b, c, p),
        orientation_2d(c, a, p),
    ];
    turns.iter().all(|&t| t == Orientation::Positive)
        || turns.iter().all(|&t| t == Orientation::Negative)
}

/// Returns `true` if two triangles overlap: an edge of one properly crosses an edge of the
/// other, or the centroid of either lies inside the other.
///
/// Triangles sharing an edge or a vertex without crossing do not overlap.
#[must_use]
pub fn triangles_overlap(first: &[Position; 3], second: &[Position; 3]) -> bool {
    for i in 0..3 {
        let (p1, p2) = (&first[i], &first[(i + 1) % 3]);
        for j in 0..3 {
            let (q1, q2) = (&second[j], &second[(j + 1) % 3]);
            if segments_properly_intersect(p1, p2, q1, q2) {
                return true;
            }
        }
    }
    let c1 = crate::geometry::quality::centroid(first);
    let c2 = crate::geometry::quality::centroid(second);
    point_in_triangle(&c1, &second[0], &second[1], &second[2])
        || point_in_triangle(&c2, &first[0], &first[1], &first[2])
}
