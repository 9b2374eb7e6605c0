//! B-spline basis functions built with the Cox-de Boor recursion.
//!
//! `B_{i,1}` is the indicator of `[t_i, t_{i+1})` and
//!
//! ```text
//! B_{i,k}(x) = (x - t_i) / (t_{i+k-1} - t_i) B_{i,k-1}(x)
//!            + (t_{i+k} - x) / (t_{i+k} - t_{i+1}) B_{i+1,k-1}(x)
//! ```
//!
//! where a term with a vanishing denominator is dropped. `B_{i,k}` is a
//! spline of order `k - 1`.

use log::{debug, trace, warn};
use ndarray::{array, Array1};

use crate::core::error::{BSplineError, Result};
use crate::core::grid::Grid;
use crate::core::scalar::Scalar;
use crate::core::spline::Spline;
use crate::core::support::Support;

/// Builds B-splines on the grid implied by a knot sequence.
#[derive(Debug, Clone)]
pub struct BSplineGenerator<T: Scalar> {
    knots: Array1<T>,
    grid: Grid<T>,
}

impl<T: Scalar> BSplineGenerator<T> {
    /// Constructs a generator and derives its grid from the knots.
    ///
    /// # Arguments
    /// * `knots` - Non-decreasing knot sequence. Repeated knots lower the
    ///   continuity of the basis at that point.
    ///
    /// # Returns
    /// The generator, or `InconsistentData` if the knots decrease somewhere.
    pub fn new(knots: Array1<T>) -> Result<Self> {
        let grid = Grid::from_knots(&knots)?;
        debug!(
            "B-spline generator with {} knots on a grid of {} points",
            knots.len(),
            grid.len()
        );
        Ok(BSplineGenerator { knots, grid })
    }

    /// Constructs a generator on an existing grid, so that the generated
    /// splines can be combined with other splines on that grid.
    ///
    /// # Returns
    /// The generator, or `InconsistentData` if `grid` is not the grid
    /// implied by `knots`.
    pub fn with_grid(knots: Array1<T>, grid: Grid<T>) -> Result<Self> {
        if Grid::from_knots(&knots)? != grid {
            return Err(BSplineError::InconsistentData(
                "The grid does not match the knot sequence.".to_string(),
            ));
        }
        Ok(BSplineGenerator { knots, grid })
    }

    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    pub fn knots(&self) -> &Array1<T> {
        &self.knots
    }

    /// Generates the B-spline of order `k - 1` anchored at knot `i`.
    ///
    /// # Arguments
    /// * `k` - Number of coefficients per interval, i.e. order plus one.
    /// * `i` - Index of the first knot of the B-spline.
    ///
    /// # Returns
    /// The B-spline, `InvalidArgument` if `k` is zero, `InvalidAccess` if
    /// knot `i + k` does not exist, or `Undetermined` if `k == 1` and
    /// `[t_i, t_{i+1}]` has zero width.
    pub fn generate_bspline(&self, k: usize, i: usize) -> Result<Spline<T>> {
        if k == 0 {
            return Err(BSplineError::InvalidArgument(
                "B-splines need at least one coefficient per interval.".to_string(),
            ));
        }
        if i.checked_add(k).map_or(true, |end| end >= self.knots.len()) {
            return Err(BSplineError::InvalidAccess {
                index: i.saturating_add(k),
                len: self.knots.len(),
            });
        }
        if k == 1 && self.knots[i] >= self.knots[i + 1] {
            return Err(BSplineError::Undetermined(format!(
                "knots {} and {} coincide",
                i,
                i + 1
            )));
        }

        // level[j] holds B_{i+j, m} after the m-th pass
        let mut level = (i..i + k)
            .map(|j| self.indicator(j))
            .collect::<Result<Vec<_>>>()?;
        for m in 2..=k {
            trace!("Cox-de Boor level {} for anchor {}", m, i);
            level = (0..level.len() - 1)
                .map(|j| self.combine(i + j, m, &level[j], &level[j + 1]))
                .collect::<Result<Vec<_>>>()?;
        }

        let bspline = level
            .pop()
            .unwrap_or_else(|| Spline::zero(self.grid.clone(), k - 1));
        if bspline.is_zero() {
            warn!(
                "B-spline of order {} at knot {} vanishes: all knots from {} to {} coincide",
                k - 1,
                i,
                i,
                i + k
            );
        }
        Ok(bspline)
    }

    /// Generates the full basis of order `k - 1`, one B-spline per anchor
    /// `i` in `0..knots.len() - k`.
    ///
    /// # Returns
    /// The basis, or `InvalidArgument` if there are fewer than `k` knots.
    pub fn generate_bsplines(&self, k: usize) -> Result<Vec<Spline<T>>> {
        if self.knots.len() < k {
            return Err(BSplineError::InvalidArgument(format!(
                "{} knots are too few for B-splines with {} coefficients per interval.",
                self.knots.len(),
                k
            )));
        }
        let count = self.knots.len() - k;
        debug!("Generating {} B-splines of order {}", count, k.saturating_sub(1));
        (0..count).map(|i| self.generate_bspline(k, i)).collect()
    }

    /// `B_{j,1}`, or a zero placeholder for a zero-width interval. The
    /// placeholder is never used: every term that would read it has a
    /// vanishing denominator.
    fn indicator(&self, j: usize) -> Result<Spline<T>> {
        let (xj, xj1) = (self.knots[j], self.knots[j + 1]);
        if xj >= xj1 {
            return Ok(Spline::zero(self.grid.clone(), 0));
        }
        let index = self.grid.find_element(xj)?;
        let support = Support::new(self.grid.clone(), index, index + 2)?;
        Spline::new(support, array![[T::one()]])
    }

    /// `B_{j,m}` from `B_{j,m-1}` and `B_{j+1,m-1}`.
    fn combine(&self, j: usize, m: usize, lower: &Spline<T>, upper: &Spline<T>) -> Result<Spline<T>> {
        let mut result = Spline::zero(self.grid.clone(), m - 1);

        let (xj, xjm1) = (self.knots[j], self.knots[j + m - 1]);
        if xjm1 > xj {
            let scaled = lower.scaled(T::one() / (xjm1 - xj));
            let term = scaled.times_x().checked_sub(&scaled.scaled(xj))?;
            result.try_add_assign(&term)?;
        }

        let (xj1, xjm) = (self.knots[j + 1], self.knots[j + m]);
        if xjm > xj1 {
            let scaled = upper.scaled(T::one() / (xjm - xj1));
            let term = scaled.scaled(xjm).checked_sub(&scaled.times_x())?;
            result.try_add_assign(&term)?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    const TOL: f64 = 1e-12;

    fn generator(knots: &[f64]) -> BSplineGenerator<f64> {
        BSplineGenerator::new(arr1(knots)).unwrap()
    }

    #[test]
    fn test_order_zero_is_indicator() {
        let gen = generator(&[0.0, 1.0, 2.0, 3.0]);
        let b = gen.generate_bspline(1, 0).unwrap();
        assert_eq!(b.order(), 0);
        assert_eq!(b.support().start_index(), 0);
        assert_eq!(b.support().end_index(), 2);
        assert_eq!(b.evaluate(0.0), 1.0);
        assert_eq!(b.evaluate(0.5), 1.0);
        assert_eq!(b.evaluate(1.5), 0.0);
        assert_eq!(b.evaluate(-0.5), 0.0);
    }

    #[test]
    fn test_linear_hat() {
        let gen = generator(&[0.0, 1.0, 2.0, 3.0]);
        let hat = gen.generate_bspline(2, 0).unwrap();
        assert_eq!(hat.order(), 1);
        assert_eq!(hat.support().start_index(), 0);
        assert_eq!(hat.support().end_index(), 3);
        assert!((hat.evaluate(1.0) - 1.0).abs() < TOL);
        assert!((hat.evaluate(0.25) - 0.25).abs() < TOL);
        assert!((hat.evaluate(1.5) - 0.5).abs() < TOL);
        assert_eq!(hat.evaluate(2.5), 0.0);
    }

    #[test]
    fn test_uniform_quadratic() {
        let gen = generator(&[0.0, 1.0, 2.0, 3.0]);
        let b = gen.generate_bspline(3, 0).unwrap();
        assert_eq!(b.order(), 2);
        assert!((b.evaluate(0.5) - 0.125).abs() < TOL);
        assert!((b.evaluate(1.5) - 0.75).abs() < TOL);
        assert!((b.evaluate(2.5) - 0.125).abs() < TOL);
        assert!((b.integrate() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_partition_of_unity() {
        let knots = [-1.0, -1.0, -1.0, -1.0, -0.6, -0.1, 0.3, 0.35, 0.9, 1.0, 1.0, 1.0, 1.0];
        let gen = generator(&knots);
        let basis = gen.generate_bsplines(4).unwrap();
        assert_eq!(basis.len(), knots.len() - 4);
        for &x in &[-0.99, -0.7, -0.3, 0.0, 0.32, 0.6, 0.95] {
            let sum: f64 = basis.iter().map(|b| b.evaluate(x)).sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum at {} is {}", x, sum);
        }
    }

    #[test]
    fn test_repeated_knots_drop_terms() {
        // clamped linear basis: the first function is 1 - x on [0, 1]
        let gen = generator(&[0.0, 0.0, 1.0, 2.0]);
        let b = gen.generate_bspline(2, 0).unwrap();
        assert_eq!(b.support().start_index(), 0);
        assert_eq!(b.support().end_index(), 2);
        assert!((b.evaluate(0.0) - 1.0).abs() < TOL);
        assert!((b.evaluate(0.25) - 0.75).abs() < TOL);
    }

    #[test]
    fn test_fully_degenerate_bspline_is_zero() {
        let gen = generator(&[0.0, 1.0, 1.0, 1.0, 2.0]);
        let b = gen.generate_bspline(2, 1).unwrap();
        assert!(b.is_zero());
        assert_eq!(b.order(), 1);
    }

    #[test]
    fn test_errors() {
        let gen = generator(&[0.0, 1.0, 1.0, 2.0]);
        assert!(matches!(gen.generate_bspline(1, 1), Err(BSplineError::Undetermined(_))));
        assert_eq!(
            gen.generate_bspline(3, 1),
            Err(BSplineError::InvalidAccess { index: 4, len: 4 })
        );
        assert!(matches!(gen.generate_bspline(0, 0), Err(BSplineError::InvalidArgument(_))));
        assert!(matches!(gen.generate_bsplines(5), Err(BSplineError::InvalidArgument(_))));
        assert!(gen.generate_bsplines(4).unwrap().is_empty());
        assert!(BSplineGenerator::new(arr1(&[0.0, 2.0, 1.0])).is_err());
    }

    #[test]
    fn test_huge_indices_are_invalid_access() {
        let gen = generator(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(
            gen.generate_bspline(usize::MAX, 1),
            Err(BSplineError::InvalidAccess { index: usize::MAX, len: 4 })
        );
        assert_eq!(
            gen.generate_bspline(2, usize::MAX),
            Err(BSplineError::InvalidAccess { index: usize::MAX, len: 4 })
        );
        assert_eq!(
            gen.generate_bspline(usize::MAX, usize::MAX),
            Err(BSplineError::InvalidAccess { index: usize::MAX, len: 4 })
        );
    }

    #[test]
    fn test_with_grid() {
        let knots = arr1(&[0.0, 0.0, 0.5, 1.0, 1.0]);
        let grid: Grid<f64> = Grid::new(vec![0.0, 0.5, 1.0]).unwrap();
        let gen = BSplineGenerator::with_grid(knots.clone(), grid.clone()).unwrap();
        let basis = gen.generate_bsplines(2).unwrap();
        assert!(basis.iter().all(|b| b.grid().shares_data_with(&grid)));

        let other = Grid::new(vec![0.0, 1.0]).unwrap();
        assert!(matches!(
            BSplineGenerator::with_grid(knots, other),
            Err(BSplineError::InconsistentData(_))
        ));
    }
}
