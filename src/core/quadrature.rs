//! Numerical integration of spline products against arbitrary functions.

use crate::core::error::{BSplineError, Result};
use crate::core::scalar::{from_usize, Scalar};
use crate::core::spline::{evaluate_interval, Spline};

/// Gauss-Legendre rule on `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussLegendre<T: Scalar> {
    nodes: Vec<T>,
    weights: Vec<T>,
}

impl<T: Scalar> GaussLegendre<T> {
    /// Builds the `points`-point rule, exact for polynomials up to degree
    /// `2 * points - 1`.
    ///
    /// # Returns
    /// The rule, or `InvalidArgument` if `points` is zero.
    pub fn new(points: usize) -> Result<Self> {
        if points == 0 {
            return Err(BSplineError::InvalidArgument(
                "A Gauss-Legendre rule needs at least one node.".to_string(),
            ));
        }
        let (nodes, weights) = legendre_rule(points);
        Ok(GaussLegendre { nodes, weights })
    }

    pub fn points(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Integrates `f` over `[a, b]`.
    pub fn integrate<F: Fn(T) -> T>(&self, f: F, a: T, b: T) -> T {
        let two = from_usize::<T>(2);
        let half_width = (b - a) / two;
        let center = (a + b) / two;
        let sum = self
            .nodes
            .iter()
            .zip(&self.weights)
            .fold(T::zero(), |acc, (&node, &weight)| acc + weight * f(center + half_width * node));
        sum * half_width
    }
}

/// Computes `∫ m1(x) f(x) m2(x) dx` by applying `rule` on every interval
/// shared by both splines.
///
/// # Returns
/// The integral, or `DifferingGrids` if the splines live on different grids.
pub fn integrate_numerically<T, F>(f: F, m1: &Spline<T>, m2: &Spline<T>, rule: &GaussLegendre<T>) -> Result<T>
where
    T: Scalar,
    F: Fn(T) -> T,
{
    let shared = m1.support().calc_intersection(m2.support())?;
    let mut result = T::zero();
    for interval in 0..shared.number_of_intervals() {
        let absolute = shared.absolute_from_relative(interval)?;
        let (Some(i1), Some(i2)) = (
            m1.support().interval_index_from_absolute(absolute),
            m2.support().interval_index_from_absolute(absolute),
        ) else {
            continue;
        };
        let (x0, x1) = (shared[interval], shared[interval + 1]);
        let xm = m1.midpoint(i1);
        let c1 = m1.coefficients().row(i1);
        let c2 = m2.coefficients().row(i2);
        result += rule.integrate(
            |x| f(x) * evaluate_interval(x, c1, xm) * evaluate_interval(x, c2, xm),
            x0,
            x1,
        );
    }
    Ok(result)
}

/// Nodes and weights of the `n`-point rule in ascending node order.
///
/// Only the non-negative roots of `P_n` are polished with Newton steps; the
/// rule is symmetric, so each one fills two slots.
fn legendre_rule<T: Scalar>(n: usize) -> (Vec<T>, Vec<T>) {
    let pi = from_usize::<T>(4) * T::one().atan();
    let tolerance = from_usize::<T>(4) * T::epsilon();
    let mut nodes = vec![T::zero(); n];
    let mut weights = vec![T::zero(); n];

    for (slot, rank) in (n / 2..n).zip((0..n.div_ceil(2)).rev()) {
        // Tricomi's estimate of the root with the given rank from the top
        let mut root = (pi * from_usize(4 * rank + 3) / from_usize(4 * n + 2)).cos();
        for _ in 0..64 {
            let (value, slope) = legendre(n, root);
            let step = value / slope;
            root -= step;
            if step.abs() <= tolerance {
                break;
            }
        }
        let (_, slope) = legendre(n, root);
        let weight = from_usize::<T>(2) / ((T::one() - root * root) * slope * slope);

        nodes[slot] = root;
        weights[slot] = weight;
        nodes[n - 1 - slot] = -root;
        weights[n - 1 - slot] = weight;
    }

    (nodes, weights)
}

/// `P_n(x)` by Bonnet's recursion, together with `P_n'(x)`.
fn legendre<T: Scalar>(n: usize, x: T) -> (T, T) {
    if n == 0 {
        return (T::one(), T::zero());
    }
    let (below, at) = (2..=n).fold((T::one(), x), |(below, at), j| {
        let j = from_usize::<T>(j);
        (at, ((j + j - T::one()) * x * at - (j - T::one()) * below) / j)
    });
    (at, from_usize::<T>(n) * (x * at - below) / (x * x - T::one()))
}
