//! Closed-form integrals of products of splines.
//!
//! On a shared interval with midpoint `xm` and half width `h` both splines are
//! polynomials in `t = x - xm`, and `∫_{-h}^{h} t^n dt` is `2 h^{n+1} / (n+1)`
//! for even `n` and zero for odd `n`. Every integral below is a finite sum of
//! such moments, so no quadrature error is involved.

use crate::core::error::Result;
use crate::core::scalar::{from_usize, powi, Scalar};
use crate::core::spline::Spline;

/// Sums `term(i, j, a_i, b_j, h, xm)` over all coefficient pairs of all
/// intervals shared by `m1` and `m2`.
fn integrate_pairwise<T, F>(m1: &Spline<T>, m2: &Spline<T>, term: F) -> Result<T>
where
    T: Scalar,
    F: Fn(usize, usize, T, T, T, T) -> T,
{
    let shared = m1.support().calc_intersection(m2.support())?;
    if !shared.contains_intervals() {
        return Ok(T::zero());
    }
    let offset1 = shared.start_index() - m1.support().start_index();
    let offset2 = shared.start_index() - m2.support().start_index();
    let two = from_usize::<T>(2);

    let mut result = T::zero();
    for interval in 0..shared.number_of_intervals() {
        let (x0, x1) = (shared[interval], shared[interval + 1]);
        let half_width = (x1 - x0) / two;
        let xm = (x1 + x0) / two;
        let a = m1.coefficients().row(offset1 + interval);
        let b = m2.coefficients().row(offset2 + interval);
        for (i, &ai) in a.iter().enumerate() {
            for (j, &bj) in b.iter().enumerate() {
                result += term(i, j, ai, bj, half_width, xm);
            }
        }
    }
    Ok(result)
}

/// `∫ m1(x) m2(x) dx`.
///
/// # Returns
/// The integral, or `DifferingGrids` if the splines live on different grids.
pub fn overlap<T: Scalar>(m1: &Spline<T>, m2: &Spline<T>) -> Result<T> {
    integrate_pairwise(m1, m2, |i, j, a, b, h, _xm| {
        let n = i + j;
        if n % 2 == 1 {
            return T::zero();
        }
        from_usize::<T>(2) * a * b * powi(h, n + 1) / from_usize(n + 1)
    })
}

/// `∫ m1(x) x m2(x) dx`.
pub fn integrate_x<T: Scalar>(m1: &Spline<T>, m2: &Spline<T>) -> Result<T> {
    integrate_pairwise(m1, m2, |i, j, a, b, h, xm| {
        let n = i + j;
        let two = from_usize::<T>(2);
        if n % 2 == 0 {
            two * a * b * xm * powi(h, n + 1) / from_usize(n + 1)
        } else {
            two * a * b * powi(h, n + 2) / from_usize(n + 2)
        }
    })
}

/// `∫ m1(x) x² m2(x) dx`.
pub fn integrate_x2<T: Scalar>(m1: &Spline<T>, m2: &Spline<T>) -> Result<T> {
    integrate_pairwise(m1, m2, |i, j, a, b, h, xm| {
        let n = i + j;
        if n % 2 == 1 {
            from_usize::<T>(4) * a * b * xm * powi(h, n + 2) / from_usize(n + 2)
        } else {
            from_usize::<T>(2)
                * a
                * b
                * powi(h, n + 1)
                * (h * h / from_usize(n + 3) + xm * xm / from_usize(n + 1))
        }
    })
}

/// `∫ m1(x) m2'(x) dx`. Assumes `m2` is continuous.
pub fn integrate_dx<T: Scalar>(m1: &Spline<T>, m2: &Spline<T>) -> Result<T> {
    integrate_pairwise(m1, m2, |i, j, a, b, h, _xm| {
        if j == 0 || (i + j) % 2 == 0 {
            return T::zero();
        }
        from_usize::<T>(2 * j) * a * b * powi(h, i + j) / from_usize(i + j)
    })
}

/// `∫ m1(x) x m2'(x) dx`. Assumes `m2` is continuous.
pub fn integrate_x_dx<T: Scalar>(m1: &Spline<T>, m2: &Spline<T>) -> Result<T> {
    integrate_pairwise(m1, m2, |i, j, a, b, h, xm| {
        if j == 0 {
            T::zero()
        } else if (i + j) % 2 == 0 {
            from_usize::<T>(2 * j) * a * b * powi(h, i + j + 1) / from_usize(i + j + 1)
        } else {
            from_usize::<T>(2 * j) * xm * a * b * powi(h, i + j) / from_usize(i + j)
        }
    })
}

/// `∫ m1(x) m2''(x) dx`. Assumes `m2` is continuously differentiable.
pub fn integrate_dx2<T: Scalar>(m1: &Spline<T>, m2: &Spline<T>) -> Result<T> {
    integrate_pairwise(m1, m2, |i, j, a, b, h, _xm| {
        if j < 2 || (i + j) % 2 == 1 {
            return T::zero();
        }
        from_usize::<T>(2 * j * (j - 1)) * a * b * powi(h, i + j - 1) / from_usize(i + j - 1)
    })
}

/// `∫ m1(x) x m2''(x) dx`. Assumes `m2` is continuously differentiable.
pub fn integrate_x_dx2<T: Scalar>(m1: &Spline<T>, m2: &Spline<T>) -> Result<T> {
    integrate_pairwise(m1, m2, |i, j, a, b, h, xm| {
        if j < 2 {
            T::zero()
        } else if (i + j) % 2 == 1 {
            from_usize::<T>(2 * j * (j - 1)) * a * b * powi(h, i + j) / from_usize(i + j)
        } else {
            from_usize::<T>(2 * j * (j - 1)) * a * b * xm * powi(h, i + j - 1) / from_usize(i + j - 1)
        }
    })
}

/// `∫ m1(x) x² m2''(x) dx`. Assumes `m2` is continuously differentiable.
pub fn integrate_x2_dx2<T: Scalar>(m1: &Spline<T>, m2: &Spline<T>) -> Result<T> {
    integrate_pairwise(m1, m2, |i, j, a, b, h, xm| {
        let factor = from_usize::<T>(j * j.saturating_sub(1));
        if j < 2 {
            T::zero()
        } else if (i + j) % 2 == 1 {
            from_usize::<T>(4) * factor * xm * a * b * powi(h, i + j) / from_usize(i + j)
        } else {
            from_usize::<T>(2)
                * factor
                * a
                * b
                * powi(h, i + j - 1)
                * (h * h / from_usize(i + j + 1) + xm * xm / from_usize(i + j - 1))
        }
    })
}
