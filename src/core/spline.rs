//! Piecewise polynomial splines on a shared [`Grid`].
//!
//! On every interval `[x_i, x_{i+1}]` of its support a spline stores the
//! coefficients `c_0, ..., c_order` of the polynomial
//! `p_i(x) = sum_j c_j (x - xm_i)^j`, where `xm_i` is the midpoint of the
//! interval. Because all splines on a grid share these midpoints, products
//! and sums of splines reduce to plain coefficient arithmetic.

use ndarray::{Array2, ArrayView1, Axis};

use crate::core::error::{BSplineError, Result};
use crate::core::grid::Grid;
use crate::core::scalar::{from_usize, powi, Scalar};
use crate::core::support::Support;

/// A piecewise polynomial of fixed order on a [`Support`].
///
/// The coefficient matrix has one row per interval of the support and
/// `order + 1` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline<T: Scalar> {
    support: Support<T>,
    coefficients: Array2<T>,
}

impl<T: Scalar> Spline<T> {
    /// Constructs a spline from its support and per-interval coefficients.
    ///
    /// # Arguments
    /// * `support` - Empty, or holding at least two grid points.
    /// * `coefficients` - One row per interval of `support`, `order + 1` columns.
    ///
    /// # Returns
    /// The spline, or `InvalidArgument` if the shapes do not match.
    pub fn new(support: Support<T>, coefficients: Array2<T>) -> Result<Self> {
        if coefficients.ncols() == 0 {
            return Err(BSplineError::InvalidArgument(
                "A spline needs at least one coefficient per interval.".to_string(),
            ));
        }
        if support.len() == 1 {
            return Err(BSplineError::InvalidArgument(
                "A spline cannot be defined on a point-like support.".to_string(),
            ));
        }
        if coefficients.nrows() != support.number_of_intervals() {
            return Err(BSplineError::InvalidArgument(format!(
                "Expected coefficients for {} intervals, got {}.",
                support.number_of_intervals(),
                coefficients.nrows()
            )));
        }
        Ok(Spline { support, coefficients })
    }

    /// The zero spline of the given order: an empty support on `grid`.
    pub fn zero(grid: Grid<T>, order: usize) -> Self {
        Spline {
            support: Support::empty(grid),
            coefficients: Array2::zeros((0, order + 1)),
        }
    }

    /// Spline of order 0 equal to `value` on the whole of `support`.
    pub fn constant(support: Support<T>, value: T) -> Result<Self> {
        let rows = support.number_of_intervals();
        Spline::new(support, Array2::from_elem((rows, 1), value))
    }

    pub(crate) fn from_parts(support: Support<T>, coefficients: Array2<T>) -> Self {
        debug_assert_eq!(coefficients.nrows(), support.number_of_intervals());
        debug_assert!(coefficients.ncols() > 0);
        Spline { support, coefficients }
    }

    pub fn support(&self) -> &Support<T> {
        &self.support
    }

    pub fn grid(&self) -> &Grid<T> {
        self.support.grid()
    }

    /// Coefficients, one row per interval of the support.
    pub fn coefficients(&self) -> &Array2<T> {
        &self.coefficients
    }

    /// Highest exponent of the per-interval polynomials.
    pub fn order(&self) -> usize {
        self.coefficients.ncols() - 1
    }

    /// Start of the support; zero for an empty spline.
    pub fn start(&self) -> T {
        self.support.front().unwrap_or_else(|_| T::zero())
    }

    /// End of the support; zero for an empty spline.
    pub fn end(&self) -> T {
        self.support.back().unwrap_or_else(|_| T::zero())
    }

    /// Midpoint of the `i`th interval of the support.
    pub(crate) fn midpoint(&self, i: usize) -> T {
        (self.support[i] + self.support[i + 1]) / from_usize(2)
    }

    /// Evaluates the spline at `x`. Zero outside of the support.
    pub fn evaluate(&self, x: T) -> T {
        match self.support.find_interval(x) {
            Some(i) => evaluate_interval(x, self.coefficients.row(i), self.midpoint(i)),
            None => T::zero(),
        }
    }

    /// True if the spline vanishes everywhere.
    pub fn is_zero(&self) -> bool {
        self.support.is_empty() || self.coefficients.iter().all(|c| *c == T::zero())
    }

    /// True if the supports of both splines overlap on more than a point.
    pub fn check_overlap(&self, other: &Spline<T>) -> bool {
        if !self.support.contains_intervals() || !other.support.contains_intervals() {
            return false;
        }
        !(other.end() <= self.start() || other.start() >= self.end())
    }

    /// Multiplies every coefficient by `factor`.
    pub fn scaled(&self, factor: T) -> Spline<T> {
        Spline::from_parts(self.support.clone(), self.coefficients.mapv(|c| c * factor))
    }

    /// Returns a copy of this spline stored with order `order`, padding the
    /// higher coefficients with zeros.
    ///
    /// # Returns
    /// The widened spline, or `OrderMismatch` if `order` is below the current order.
    pub fn with_order(&self, order: usize) -> Result<Spline<T>> {
        if order < self.order() {
            return Err(BSplineError::OrderMismatch {
                expected: order,
                found: self.order(),
            });
        }
        let mut coefficients = Array2::zeros((self.coefficients.nrows(), order + 1));
        coefficients
            .slice_mut(ndarray::s![.., ..self.coefficients.ncols()])
            .assign(&self.coefficients);
        Ok(Spline::from_parts(self.support.clone(), coefficients))
    }

    /// Replaces this spline by `other` while keeping this spline's order.
    ///
    /// # Returns
    /// `OrderMismatch` if `other` has a higher order than this spline.
    pub fn assign_from(&mut self, other: &Spline<T>) -> Result<()> {
        *self = other.with_order(self.order())?;
        Ok(())
    }

    /// Spline equal to this one on the intervals lying completely inside
    /// `[x0, x1]`, zero everywhere else.
    pub fn restrict_support(&self, x0: T, x1: T) -> Spline<T> {
        let kept: Vec<usize> = (0..self.support.number_of_intervals())
            .filter(|&i| self.support[i] >= x0 && self.support[i + 1] <= x1)
            .collect();
        let (first, last) = match (kept.first(), kept.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Spline::zero(self.grid().clone(), self.order()),
        };
        let start = self.support.start_index() + first;
        let end = self.support.start_index() + last + 2;
        let support = Support::new(self.grid().clone(), start, end)
            .unwrap_or_else(|_| Support::empty(self.grid().clone()));
        let coefficients = self.coefficients.select(Axis(0), &kept);
        Spline::from_parts(support, coefficients)
    }

    /// Returns `g(x) = x f(x)`, a spline of order `order + 1`.
    pub fn times_x(&self) -> Spline<T> {
        let n = self.order() + 1;
        let mut coefficients = Array2::zeros((self.coefficients.nrows(), n + 1));
        for (i, (old, mut new)) in self
            .coefficients
            .outer_iter()
            .zip(coefficients.outer_iter_mut())
            .enumerate()
        {
            // x = xm + (x - xm)
            let xm = self.midpoint(i);
            for j in 0..=n {
                if j > 0 {
                    new[j] = new[j] + old[j - 1];
                }
                if j < n {
                    new[j] = new[j] + xm * old[j];
                }
            }
        }
        Spline::from_parts(self.support.clone(), coefficients)
    }

    /// Returns `g(x) = f(-x)`.
    ///
    /// The result lives on the reflected grid. That is the same grid only if
    /// the grid is symmetric around zero.
    pub fn invert(&self) -> Spline<T> {
        if self.is_zero() {
            return self.clone();
        }
        let mut coefficients = self.coefficients.slice(ndarray::s![..;-1, ..]).to_owned();
        for mut column in coefficients.columns_mut().into_iter().skip(1).step_by(2) {
            column.mapv_inplace(|c| -c);
        }
        Spline::from_parts(self.support.reflect(), coefficients)
    }

    /// Returns the `n`th derivative. If `n` exceeds the order the result is
    /// the zero spline of order 0.
    pub fn dx(&self, n: usize) -> Spline<T> {
        if n == 0 {
            return self.clone();
        }
        if n > self.order() {
            return Spline::zero(self.grid().clone(), 0);
        }
        let new_order = self.order() - n;
        let mut coefficients = Array2::zeros((self.coefficients.nrows(), new_order + 1));
        for (old, mut new) in self.coefficients.outer_iter().zip(coefficients.outer_iter_mut()) {
            for i in n..old.len() {
                let falling: usize = (0..n).map(|j| i - j).product();
                new[i - n] = from_usize::<T>(falling) * old[i];
            }
        }
        Spline::from_parts(self.support.clone(), coefficients)
    }

    pub fn dx2(&self) -> Spline<T> {
        self.dx(2)
    }

    pub fn dx3(&self) -> Spline<T> {
        self.dx(3)
    }

    /// Integral of the spline over its support, computed analytically.
    pub fn integrate(&self) -> T {
        let two = from_usize::<T>(2);
        let mut result = T::zero();
        for (i, coeffs) in self.coefficients.outer_iter().enumerate() {
            let half_width = (self.support[i + 1] - self.support[i]) / two;
            // Odd powers of (x - xm) integrate to zero.
            for j in (0..coeffs.len()).step_by(2) {
                result = result + two * coeffs[j] * powi(half_width, j + 1) / from_usize(j + 1);
            }
        }
        result
    }

    /// Re-expresses the spline on `grid`, which must contain every grid point
    /// of the current support. Intervals split by additional points get the
    /// same polynomial, re-centred on their own midpoints.
    ///
    /// # Returns
    /// The spline on `grid`, or `InconsistentData` if one of the current
    /// support points is missing from `grid`.
    pub fn to_grid(&self, grid: Grid<T>) -> Result<Spline<T>> {
        if !self.support.contains_intervals() {
            return Ok(Spline::zero(grid, self.order()));
        }
        let indices = self
            .support
            .points()
            .iter()
            .map(|&p| grid.find_element(p))
            .collect::<Result<Vec<usize>>>()?;
        let (start, end) = match (indices.first(), indices.last()) {
            (Some(&start), Some(&end)) => (start, end + 1),
            _ => return Ok(Spline::zero(grid, self.order())),
        };
        let support = Support::new(grid, start, end)?;

        let two = from_usize::<T>(2);
        let mut coefficients = Array2::zeros((support.number_of_intervals(), self.order() + 1));
        for (r, mut row) in coefficients.outer_iter_mut().enumerate() {
            let xm = (support[r] + support[r + 1]) / two;
            let Some(i) = self.support.find_interval(xm) else {
                continue;
            };
            // Taylor shift: c'_l = sum_{j >= l} C(j, l) d^{j - l} c_j
            let shift = xm - self.midpoint(i);
            let old = self.coefficients.row(i);
            for l in 0..old.len() {
                let (mut binomial, mut power) = (T::one(), T::one());
                for j in l..old.len() {
                    row[l] += binomial * power * old[j];
                    binomial = binomial * from_usize(j + 1) / from_usize(j + 1 - l);
                    power = power * shift;
                }
            }
        }
        Ok(Spline::from_parts(support, coefficients))
    }

    /// Converts the spline to another scalar type. The grid is converted as
    /// well, so the result is not defined on the same grid instance.
    ///
    /// # Returns
    /// The converted spline, or `InconsistentData` if a grid point cannot be
    /// represented in `U`.
    pub fn convert<U: Scalar>(&self) -> Result<Spline<U>> {
        let cast = |x: T| -> Result<U> {
            <U as num_traits::NumCast>::from(x).ok_or_else(|| {
                BSplineError::InconsistentData(format!("{:?} is not representable.", x))
            })
        };
        let points = self.grid().iter().map(|&x| cast(x)).collect::<Result<Vec<U>>>()?;
        let grid = Grid::new(points)?;
        let support = Support::new(grid, self.support.start_index(), self.support.end_index())?;
        let coefficients = self
            .coefficients
            .iter()
            .map(|&c| cast(c))
            .collect::<Result<Vec<U>>>()?;
        let shape = (self.coefficients.nrows(), self.coefficients.ncols());
        let coefficients = Array2::from_shape_vec(shape, coefficients)
            .map_err(|e| BSplineError::InvalidArgument(e.to_string()))?;
        Spline::new(support, coefficients)
    }
}

/// Evaluates `sum_j c_j (x - xm)^j` with Horner's method.
pub(crate) fn evaluate_interval<T: Scalar>(x: T, coefficients: ArrayView1<'_, T>, xm: T) -> T {
    let dx = x - xm;
    coefficients
        .iter()
        .rev()
        .fold(T::zero(), |acc, &c| acc * dx + c)
}
