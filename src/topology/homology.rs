//! Chains, boundary operators and a Betti-number estimate.
//!
//! Only `b0` is computed exactly (union-find over the vertex/edge graph). The higher Betti
//! numbers are inferred from χ = b0 − b1 + b2 − b3:
//!
//! - 2D: `b2 = 0` is assumed (the complexes grown here are open), so `b1 = b0 − χ`.
//! - 3D: `b3 = 0` is assumed, leaving one deficit `χ − b0 = b2 − b1`. A negative deficit is
//!   assigned entirely to `b1`, a positive one entirely to `b2`.
//!
//! The 3D assignment is an approximation. A complex with both tunnels and cavities has
//! `b1` and `b2` nonzero at once and will be misreported. Exact homology would need the ranks
//! of the boundary matrices, which this module does not compute.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::collections::FastHashMap;
use crate::core::complex::SimplicialComplex;
use crate::core::edge::EdgeKey;
use crate::core::simplex::{Dimension, Face, VertexId};

/// A 1-chain: integer coefficients on canonically keyed edges.
///
/// The coefficient refers to the edge oriented from its smaller to its larger vertex id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    coefficients: BTreeMap<EdgeKey, i32>,
}

impl Chain {
    /// The empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coefficient` times the oriented edge `from → to`. Zero terms are dropped.
    pub fn add_oriented(&mut self, from: VertexId, to: VertexId, coefficient: i32) {
        let key = EdgeKey::new(from, to);
        let signed = if from <= to { coefficient } else { -coefficient };
        let entry = self.coefficients.entry(key).or_insert(0);
        *entry += signed;
        if *entry == 0 {
            self.coefficients.remove(&key);
        }
    }

    /// Coefficient of `edge`, 0 if absent.
    #[must_use]
    pub fn coefficient(&self, edge: EdgeKey) -> i32 {
        self.coefficients.get(&edge).copied().unwrap_or(0)
    }

    /// Nonzero terms in key order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeKey, i32)> + '_ {
        self.coefficients.iter().map(|(k, c)| (*k, *c))
    }

    /// Number of nonzero terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns `true` if every coefficient is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Boundary of this 1-chain as vertex coefficients (∂[a,b] = b − a).
    #[must_use]
    pub fn boundary(&self) -> BTreeMap<VertexId, i32> {
        let mut out: BTreeMap<VertexId, i32> = BTreeMap::new();
        for (edge, c) in self.iter() {
            *out.entry(edge.v1()).or_default() += c;
            *out.entry(edge.v0()).or_default() -= c;
        }
        out.retain(|_, c| *c != 0);
        out
    }
}

/// Oriented boundary of a face `[v0, v1, v2]`: `[v1,v2] − [v0,v2] + [v0,v1]`.
///
/// # Examples
///
/// ```rust
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::topology::homology::boundary_of_face;
///
/// let complex = SimplicialComplex::initial_triangle();
/// let face = complex.faces().next().unwrap();
/// let chain = boundary_of_face(face);
/// assert_eq!(chain.len(), 3);
/// assert!(chain.boundary().is_empty());
/// ```
#[must_use]
pub fn boundary_of_face(face: &Face) -> Chain {
    let [v0, v1, v2] = face.vertices();
    let mut chain = Chain::new();
    chain.add_oriented(v1, v2, 1);
    chain.add_oriented(v0, v2, -1);
    chain.add_oriented(v0, v1, 1);
    chain
}

/// Number of connected components of the vertex/edge graph, by union-find.
#[must_use]
pub fn connected_components(complex: &SimplicialComplex) -> usize {
    let index: FastHashMap<VertexId, usize> = complex
        .vertex_ids()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();
    let n = index.len();
    let mut parent: Vec<usize> = (0..n).collect();
    let mut rank = vec![0_usize; n];

    fn find(parent: &mut [usize], i: usize) -> usize {
        if parent[i] != i {
            parent[i] = find(parent, parent[i]);
        }
        parent[i]
    }

    fn union(parent: &mut [usize], rank: &mut [usize], x: usize, y: usize) -> bool {
        let rx = find(parent, x);
        let ry = find(parent, y);
        if rx == ry {
            return false;
        }
        if rank[rx] < rank[ry] {
            parent[rx] = ry;
        } else if rank[rx] > rank[ry] {
            parent[ry] = rx;
        } else {
            parent[ry] = rx;
            rank[rx] += 1;
        }
        true
    }

    let mut components = n;
    for edge in complex.edges() {
        let [a, b] = edge.vertices();
        if let (Some(&x), Some(&y)) = (index.get(&a), index.get(&b))
            && union(&mut parent, &mut rank, x, y)
        {
            components -= 1;
        }
    }
    components
}

/// Estimated Betti numbers. Only `b0` is exact; see the module docs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettiEstimate {
    /// Connected components (exact).
    pub b0: usize,
    /// Independent loops (inferred).
    pub b1: usize,
    /// Enclosed cavities (inferred; always 0 in 2D).
    pub b2: usize,
    /// Always 0.
    pub b3: usize,
}

impl BettiEstimate {
    /// χ implied by the estimate.
    #[must_use]
    pub fn euler_characteristic(&self) -> isize {
        to_isize(self.b0) - to_isize(self.b1) + to_isize(self.b2) - to_isize(self.b3)
    }
}

/// Estimates Betti numbers of `complex` from `b0` and χ.
///
/// # Examples
///
/// ```rust
/// use pachner::core::complex::SimplicialComplex;
/// use pachner::topology::homology::estimate_betti_numbers;
///
/// let betti = estimate_betti_numbers(&SimplicialComplex::tetrahedron_strip(3));
/// assert_eq!((betti.b0, betti.b1, betti.b2), (1, 0, 0));
/// ```
#[must_use]
pub fn estimate_betti_numbers(complex: &SimplicialComplex) -> BettiEstimate {
    let b0 = connected_components(complex);
    let chi = complex.euler_characteristic();
    let deficit = chi - to_isize(b0);
    let estimate = match complex.dimension() {
        Dimension::Two => BettiEstimate {
            b0,
            b1: (-deficit).max(0).unsigned_abs(),
            ..BettiEstimate::default()
        },
        Dimension::Three if deficit < 0 => BettiEstimate {
            b0,
            b1: deficit.unsigned_abs(),
            ..BettiEstimate::default()
        },
        Dimension::Three => BettiEstimate {
            b0,
            b2: deficit.unsigned_abs(),
            ..BettiEstimate::default()
        },
    };
    tracing::trace!(?estimate, chi, "estimated Betti numbers");
    estimate
}

/// Returns `true` if χ is unchanged; a mismatch after a Pachner move is a bug.
#[must_use]
pub const fn verify_homology_preservation(chi_before: isize, chi_after: isize) -> bool {
    chi_before == chi_after
}

fn to_isize(value: usize) -> isize {
    isize::try_from(value).unwrap_or(isize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_boundary_is_a_cycle() {
        let complex = SimplicialComplex::triangle_strip(3);
        for face in complex.faces() {
            let chain = boundary_of_face(face);
            assert_eq!(chain.len(), 3);
            assert!(chain.boundary().is_empty(), "∂∂ should vanish for {face:?}");
        }
    }

    #[test]
    fn shared_edge_cancels_between_consistently_oriented_faces() {
        let [a, b, c, d] = [0, 1, 2, 3].map(VertexId::new);
        let mut complex = SimplicialComplex::new(Dimension::Two);
        for _ in 0..4 {
            complex.add_vertex();
        }
        let f1 = complex.add_face(a, b, c).unwrap();
        let f2 = complex.add_face(a, c, d).unwrap();
        let mut sum = Chain::new();
        for face in [f1, f2] {
            for (edge, coefficient) in boundary_of_face(complex.face(face).unwrap()).iter() {
                sum.add_oriented(edge.v0(), edge.v1(), coefficient);
            }
        }
        assert_eq!(sum.coefficient(EdgeKey::new(a, c)), 0);
        assert_eq!(sum.len(), 4);
    }

    #[test]
    fn components_count_isolated_vertices() {
        let mut complex = SimplicialComplex::initial_triangle();
        assert_eq!(connected_components(&complex), 1);
        complex.add_vertex();
        complex.add_vertex();
        assert_eq!(connected_components(&complex), 3);
    }

    #[test]
    fn two_dimensional_estimate_uses_chi() {
        let complex = SimplicialComplex::triangle_strip(5);
        let betti = estimate_betti_numbers(&complex);
        assert_eq!(betti, BettiEstimate { b0: 1, ..Default::default() });
        assert_eq!(betti.euler_characteristic(), complex.euler_characteristic());
    }

    #[test]
    fn hollow_tetrahedron_reports_a_cavity() {
        // Boundary surface of a tetrahedron in a 3D complex: χ = 2, b0 = 1.
        let mut complex = SimplicialComplex::new(Dimension::Three);
        let [a, b, c, d] = [(); 4].map(|()| complex.add_vertex());
        for [x, y, z] in [[a, b, c], [a, b, d], [a, c, d], [b, c, d]] {
            complex.add_edge(x, y).unwrap();
            complex.add_edge(y, z).unwrap();
            complex.add_edge(x, z).unwrap();
            complex.add_face(x, y, z).unwrap();
        }
        let betti = estimate_betti_numbers(&complex);
        assert_eq!((betti.b0, betti.b1, betti.b2), (1, 0, 1));
    }

    #[test]
    fn loop_of_edges_reports_a_tunnel() {
        let mut complex = SimplicialComplex::new(Dimension::Three);
        let [a, b, c] = [(); 3].map(|()| complex.add_vertex());
        complex.add_edge(a, b).unwrap();
        complex.add_edge(b, c).unwrap();
        complex.add_edge(c, a).unwrap();
        let betti = estimate_betti_numbers(&complex);
        assert_eq!((betti.b0, betti.b1, betti.b2), (1, 1, 0));
    }

    #[test]
    fn preservation_check() {
        assert!(verify_homology_preservation(1, 1));
        assert!(!verify_homology_preservation(1, 2));
    }
}
