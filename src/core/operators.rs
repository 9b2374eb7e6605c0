//! Arithmetic between splines and between splines and scalars.
//!
//! The `checked_*` methods report grid mismatches as errors. The operator
//! impls delegate to them and panic on a mismatch, the same way `ndarray`
//! panics on incompatible shapes.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use ndarray::{s, Array2};

use crate::core::error::{BSplineError, Result};
use crate::core::scalar::Scalar;
use crate::core::spline::Spline;

impl<T: Scalar> Spline<T> {
    /// Sum of two splines, of order `max(self.order(), other.order())`.
    ///
    /// The result is defined on the smallest contiguous support covering both
    /// operands; intervals covered by neither operand are zero.
    ///
    /// # Returns
    /// The sum, or `DifferingGrids` if the splines live on different grids.
    pub fn checked_add(&self, other: &Spline<T>) -> Result<Spline<T>> {
        let support = self.support().calc_union(other.support())?;
        let order = self.order().max(other.order());
        let mut coefficients = Array2::zeros((support.number_of_intervals(), order + 1));
        for operand in [self, other] {
            let Some(offset) = support.relative_from_absolute(operand.support().start_index()) else {
                continue;
            };
            let rows = operand.coefficients().nrows();
            let cols = operand.coefficients().ncols();
            let mut target = coefficients.slice_mut(s![offset..offset + rows, ..cols]);
            target += operand.coefficients();
        }
        Ok(Spline::from_parts(support, coefficients))
    }

    /// Difference of two splines. See [`Spline::checked_add`].
    pub fn checked_sub(&self, other: &Spline<T>) -> Result<Spline<T>> {
        self.checked_add(&-other)
    }

    /// Product of two splines, of order `self.order() + other.order()`.
    ///
    /// The polynomials of both operands are multiplied on every shared
    /// interval. Splines without overlap yield the zero spline.
    ///
    /// # Returns
    /// The product, or `DifferingGrids` if the splines live on different grids.
    pub fn checked_mul(&self, other: &Spline<T>) -> Result<Spline<T>> {
        let order = self.order() + other.order();
        let support = self.support().calc_intersection(other.support())?;
        if !support.contains_intervals() {
            return Ok(Spline::zero(self.grid().clone(), order));
        }
        let offset_a = support.start_index() - self.support().start_index();
        let offset_b = support.start_index() - other.support().start_index();
        let mut coefficients = Array2::zeros((support.number_of_intervals(), order + 1));
        for (i, mut row) in coefficients.outer_iter_mut().enumerate() {
            let a = self.coefficients().row(offset_a + i);
            let b = other.coefficients().row(offset_b + i);
            for (j, &aj) in a.iter().enumerate() {
                for (k, &bk) in b.iter().enumerate() {
                    row[j + k] = row[j + k] + aj * bk;
                }
            }
        }
        Ok(Spline::from_parts(support, coefficients))
    }

    /// In-place sum that keeps this spline's order.
    ///
    /// # Returns
    /// `OrderMismatch` if `other` has a higher order than this spline,
    /// `DifferingGrids` if the grids differ. On error `self` is unchanged.
    pub fn try_add_assign(&mut self, other: &Spline<T>) -> Result<()> {
        if other.order() > self.order() {
            return Err(BSplineError::OrderMismatch {
                expected: self.order(),
                found: other.order(),
            });
        }
        *self = self.checked_add(other)?;
        Ok(())
    }

    /// In-place difference that keeps this spline's order.
    /// See [`Spline::try_add_assign`].
    pub fn try_sub_assign(&mut self, other: &Spline<T>) -> Result<()> {
        self.try_add_assign(&-other)
    }
}

fn unwrap_or_panic<T>(result: Result<T>, op: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("spline {} failed: {}", op, e),
    }
}

impl<T: Scalar> Neg for &Spline<T> {
    type Output = Spline<T>;

    fn neg(self) -> Spline<T> {
        self.scaled(-T::one())
    }
}

impl<T: Scalar> Neg for Spline<T> {
    type Output = Spline<T>;

    fn neg(self) -> Spline<T> {
        -&self
    }
}

macro_rules! impl_spline_binop {
    ($trait:ident, $method:ident, $checked:ident, $name:expr) => {
        /// # Panics
        /// If the splines are defined on different grids.
        impl<T: Scalar> $trait<&Spline<T>> for &Spline<T> {
            type Output = Spline<T>;

            fn $method(self, rhs: &Spline<T>) -> Spline<T> {
                unwrap_or_panic(self.$checked(rhs), $name)
            }
        }

        impl<T: Scalar> $trait<Spline<T>> for Spline<T> {
            type Output = Spline<T>;

            fn $method(self, rhs: Spline<T>) -> Spline<T> {
                (&self).$method(&rhs)
            }
        }

        impl<T: Scalar> $trait<&Spline<T>> for Spline<T> {
            type Output = Spline<T>;

            fn $method(self, rhs: &Spline<T>) -> Spline<T> {
                (&self).$method(rhs)
            }
        }

        impl<T: Scalar> $trait<Spline<T>> for &Spline<T> {
            type Output = Spline<T>;

            fn $method(self, rhs: Spline<T>) -> Spline<T> {
                self.$method(&rhs)
            }
        }
    };
}

impl_spline_binop!(Add, add, checked_add, "addition");
impl_spline_binop!(Sub, sub, checked_sub, "subtraction");
impl_spline_binop!(Mul, mul, checked_mul, "multiplication");

/// # Panics
/// If `rhs` has a higher order than `self` or lives on a different grid.
impl<T: Scalar> AddAssign<&Spline<T>> for Spline<T> {
    fn add_assign(&mut self, rhs: &Spline<T>) {
        unwrap_or_panic(self.try_add_assign(rhs), "addition");
    }
}

impl<T: Scalar> AddAssign<Spline<T>> for Spline<T> {
    fn add_assign(&mut self, rhs: Spline<T>) {
        *self += &rhs;
    }
}

/// # Panics
/// If `rhs` has a higher order than `self` or lives on a different grid.
impl<T: Scalar> SubAssign<&Spline<T>> for Spline<T> {
    fn sub_assign(&mut self, rhs: &Spline<T>) {
        unwrap_or_panic(self.try_sub_assign(rhs), "subtraction");
    }
}

impl<T: Scalar> SubAssign<Spline<T>> for Spline<T> {
    fn sub_assign(&mut self, rhs: Spline<T>) {
        *self -= &rhs;
    }
}

impl<T: Scalar> Mul<T> for &Spline<T> {
    type Output = Spline<T>;

    fn mul(self, rhs: T) -> Spline<T> {
        self.scaled(rhs)
    }
}

impl<T: Scalar> Mul<T> for Spline<T> {
    type Output = Spline<T>;

    fn mul(self, rhs: T) -> Spline<T> {
        self.scaled(rhs)
    }
}

/// Division by zero follows the semantics of `T`.
impl<T: Scalar> Div<T> for &Spline<T> {
    type Output = Spline<T>;

    fn div(self, rhs: T) -> Spline<T> {
        self.scaled(T::one() / rhs)
    }
}

impl<T: Scalar> Div<T> for Spline<T> {
    type Output = Spline<T>;

    fn div(self, rhs: T) -> Spline<T> {
        &self / rhs
    }
}

impl<T: Scalar> MulAssign<T> for Spline<T> {
    fn mul_assign(&mut self, rhs: T) {
        *self = self.scaled(rhs);
    }
}

impl<T: Scalar> DivAssign<T> for Spline<T> {
    fn div_assign(&mut self, rhs: T) {
        *self = self.scaled(T::one() / rhs);
    }
}

macro_rules! impl_scalar_lhs_mul {
    ($($t:ty),*) => {
        $(
            impl Mul<&Spline<$t>> for $t {
                type Output = Spline<$t>;

                fn mul(self, rhs: &Spline<$t>) -> Spline<$t> {
                    rhs.scaled(self)
                }
            }

            impl Mul<Spline<$t>> for $t {
                type Output = Spline<$t>;

                fn mul(self, rhs: Spline<$t>) -> Spline<$t> {
                    rhs.scaled(self)
                }
            }
        )*
    };
}

impl_scalar_lhs_mul!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Grid;
    use crate::core::support::Support;
    use ndarray::array;

    const TOL: f64 = 1e-12;

    fn grid() -> Grid<f64> {
        Grid::new(vec![0.0, 0.5, 1.0, 1.75, 2.0, 3.0, 4.5]).unwrap()
    }

    fn sample_points() -> Vec<f64> {
        (0..=90).map(|i| -0.25 + i as f64 * 0.055).collect()
    }

    fn a() -> Spline<f64> {
        Spline::new(
            Support::new(grid(), 0, 4).unwrap(),
            array![[1.0, 2.0], [0.5, -1.0], [3.0, 0.25]],
        )
        .unwrap()
    }

    fn b() -> Spline<f64> {
        Spline::new(
            Support::new(grid(), 2, 6).unwrap(),
            array![[0.0, 1.0, 1.0], [2.0, 0.0, -0.5], [1.0, 1.0, 1.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_add_evaluates_pointwise() {
        let (a, b) = (a(), b());
        let sum = &a + &b;
        assert_eq!(sum.order(), 2);
        assert_eq!(sum.support().start_index(), 0);
        assert_eq!(sum.support().end_index(), 6);
        for x in sample_points() {
            assert!((sum.evaluate(x) - (a.evaluate(x) + b.evaluate(x))).abs() < TOL, "x = {}", x);
        }
    }

    #[test]
    fn test_add_disjoint_supports_fills_gap_with_zero() {
        let left = Spline::constant(Support::new(grid(), 0, 2).unwrap(), 2.0).unwrap();
        let right = Spline::constant(Support::new(grid(), 4, 6).unwrap(), 3.0).unwrap();
        let sum = &left + &right;
        assert_eq!(sum.coefficients().nrows(), 5);
        assert_eq!(sum.evaluate(0.25), 2.0);
        assert_eq!(sum.evaluate(1.5), 0.0);
        assert_eq!(sum.evaluate(2.5), 3.0);
    }

    #[test]
    fn test_add_with_empty_operand() {
        let a = a();
        let sum = &a + &Spline::zero(grid(), 4);
        assert_eq!(sum.order(), 4);
        assert_eq!(sum.support(), a.support());
        assert_eq!(sum.with_order(4).unwrap(), a.with_order(4).unwrap());
    }

    #[test]
    fn test_sub_and_neg() {
        let (a, b) = (a(), b());
        let diff = &a - &b;
        let neg = -&b;
        for x in sample_points() {
            assert!((diff.evaluate(x) - (a.evaluate(x) - b.evaluate(x))).abs() < TOL);
            assert!((neg.evaluate(x) + b.evaluate(x)).abs() < TOL);
        }
        assert!((&a - &a).is_zero());
    }

    #[test]
    fn test_mul_evaluates_pointwise_on_overlap() {
        let (a, b) = (a(), b());
        let product = &a * &b;
        assert_eq!(product.order(), 3);
        assert_eq!(product.support().start_index(), 2);
        assert_eq!(product.support().end_index(), 4);
        for x in sample_points() {
            assert!((product.evaluate(x) - a.evaluate(x) * b.evaluate(x)).abs() < 1e-11, "x = {}", x);
        }
    }

    #[test]
    fn test_mul_without_overlap_is_zero() {
        let left = Spline::constant(Support::new(grid(), 0, 3).unwrap(), 2.0).unwrap();
        let right = Spline::constant(Support::new(grid(), 2, 6).unwrap(), 3.0).unwrap();
        let product = &left * &right;
        assert!(product.is_zero());
        assert!(product.support().is_empty());
        assert_eq!(product.order(), 0);
    }

    #[test]
    fn test_scalar_operators() {
        let a = a();
        let doubled = 2.0 * &a;
        let halved = &a / 2.0;
        let mut c = a.clone();
        c *= 4.0;
        c /= 2.0;
        assert_eq!(doubled, c);
        assert_eq!(&a * 2.0, doubled);
        for x in sample_points() {
            assert!((halved.evaluate(x) - 0.5 * a.evaluate(x)).abs() < TOL);
        }
    }

    #[test]
    fn test_add_assign_requires_lower_order() {
        let mut target = b();
        let original = target.clone();
        target += &a();
        assert_eq!(target.order(), 2);
        for x in sample_points() {
            assert!((target.evaluate(x) - (original.evaluate(x) + a().evaluate(x))).abs() < TOL);
        }

        let mut low = a();
        assert_eq!(
            low.try_add_assign(&b()),
            Err(BSplineError::OrderMismatch { expected: 1, found: 2 })
        );
        assert_eq!(low, a());
        low -= a();
        assert!(low.is_zero());
    }

    #[test]
    fn test_differing_grids_fail() {
        let other = Spline::constant(Support::whole_grid(Grid::new(vec![0.0, 1.0]).unwrap()), 1.0).unwrap();
        assert_eq!(a().checked_add(&other), Err(BSplineError::DifferingGrids));
        assert_eq!(a().checked_mul(&other), Err(BSplineError::DifferingGrids));
    }

    #[test]
    #[should_panic(expected = "spline addition failed")]
    fn test_add_operator_panics_on_differing_grids() {
        let other = Spline::constant(Support::whole_grid(Grid::new(vec![0.0, 1.0]).unwrap()), 1.0).unwrap();
        let _ = a() + other;
    }
}
