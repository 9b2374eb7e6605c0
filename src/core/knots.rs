use std::cmp::Ordering;

use ndarray::Array1;

use crate::core::error::{BSplineError, Result};
use crate::core::scalar::{from_usize, Scalar};

/// Generates a clamped knot vector with knots placed at quantiles of the data points.
///
/// # Arguments
/// * `data_points` - Covariate data x_i, in any order.
/// * `num_internal_knots` - Number of knots to place between the boundaries.
/// * `order` - Number of coefficients per interval of the basis (spline order plus one).
///   The boundary knots are repeated this many times.
///
/// # Returns
/// The knot vector, or `InvalidArgument` if the data cannot support the request.
pub fn quantile_knots<T: Scalar>(
    data_points: &Array1<T>,
    num_internal_knots: usize,
    order: usize,
) -> Result<Array1<T>> {
    check_order(order)?;
    if data_points.is_empty() {
        return Err(BSplineError::InvalidArgument(
            "Data points array cannot be empty.".to_string(),
        ));
    }
    if data_points.iter().any(|x| x.is_nan()) {
        return Err(BSplineError::InvalidArgument(
            "Data points must not contain NaN.".to_string(),
        ));
    }

    let mut unique_sorted_data = data_points.to_vec();
    unique_sorted_data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    unique_sorted_data.dedup();

    let x_min = unique_sorted_data[0];
    let x_max = unique_sorted_data[unique_sorted_data.len() - 1];

    // candidates lie strictly between the boundaries
    let internal_candidates = &unique_sorted_data[1..unique_sorted_data.len().saturating_sub(1).max(1)];
    if internal_candidates.len() < num_internal_knots {
        return Err(BSplineError::InvalidArgument(format!(
            "Not enough unique data points strictly between {:?} and {:?} to select {} internal knots. Found {} candidates.",
            x_min,
            x_max,
            num_internal_knots,
            internal_candidates.len()
        )));
    }

    let mut knots_vec = Vec::with_capacity(2 * order + num_internal_knots);
    knots_vec.extend(std::iter::repeat(x_min).take(order));
    if num_internal_knots > 0 {
        let last = internal_candidates.len() - 1;
        let buckets = num_internal_knots + 1;
        for i in 1..=num_internal_knots {
            // round(i * last / buckets), half away from zero
            let index = (2 * i * last + buckets) / (2 * buckets);
            knots_vec.push(internal_candidates[index.min(last)]);
        }
    }
    knots_vec.extend(std::iter::repeat(x_max).take(order));

    Ok(Array1::from(knots_vec))
}

/// Generates a clamped knot vector with uniformly spaced internal knots.
///
/// # Arguments
/// * `x_min` - Minimum value of the range.
/// * `x_max` - Maximum value of the range.
/// * `num_internal_knots` - Number of knots to place between the boundaries.
/// * `order` - Number of coefficients per interval of the basis (spline order plus one).
///
/// # Returns
/// The knot vector, or `InvalidArgument` if the range is empty or reversed.
pub fn uniform_knots<T: Scalar>(
    x_min: T,
    x_max: T,
    num_internal_knots: usize,
    order: usize,
) -> Result<Array1<T>> {
    check_order(order)?;
    if !(x_min <= x_max) {
        return Err(BSplineError::InvalidArgument(format!(
            "x_min ({:?}) cannot be greater than x_max ({:?}).",
            x_min, x_max
        )));
    }
    if x_min == x_max && num_internal_knots > 0 {
        return Err(BSplineError::InvalidArgument(format!(
            "Cannot place {} internal knots as x_min equals x_max ({:?}).",
            num_internal_knots, x_min
        )));
    }

    let step = (x_max - x_min) / from_usize(num_internal_knots + 1);
    let mut knots_vec = Vec::with_capacity(2 * order + num_internal_knots);
    knots_vec.extend(std::iter::repeat(x_min).take(order));
    knots_vec.extend((1..=num_internal_knots).map(|i| x_min + from_usize::<T>(i) * step));
    knots_vec.extend(std::iter::repeat(x_max).take(order));

    Ok(Array1::from(knots_vec))
}

/// Validates a knot vector for B-splines with `order` coefficients per interval.
///
/// The knots must be non-decreasing, leave room for at least one basis
/// function and give each basis function `j` a support `[t_j, t_{j+order}]`
/// of positive width.
///
/// # Returns
/// `Ok(())` if the knot vector is valid, `InconsistentData` if it decreases,
/// or `InvalidArgument` otherwise.
pub fn validate_knots<T: Scalar>(knots: &Array1<T>, order: usize) -> Result<()> {
    check_order(order)?;
    if knots.len() <= order {
        return Err(BSplineError::InvalidArgument(format!(
            "Expected more than {} knots, got {}.",
            order,
            knots.len()
        )));
    }

    if let Some(i) = (1..knots.len()).find(|&i| !(knots[i - 1] <= knots[i])) {
        return Err(BSplineError::InconsistentData(format!(
            "Knot vector is not non-decreasing: t_{}={:?} > t_{}={:?}",
            i - 1,
            knots[i - 1],
            i,
            knots[i]
        )));
    }

    if let Some(j) = (0..knots.len() - order).find(|&j| knots[j + order] <= knots[j]) {
        return Err(BSplineError::InvalidArgument(format!(
            "Basis function {} has an empty support: t_{} = t_{} = {:?}.",
            j,
            j,
            j + order,
            knots[j]
        )));
    }

    Ok(())
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(BSplineError::InvalidArgument(
            "Order must be at least 1.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    const TOL: f64 = 1e-9;

    fn assert_arr_eq(a: &Array1<f64>, b: &Array1<f64>) {
        assert_eq!(a.len(), b.len(), "Array lengths differ.");
        for (i, (val_a, val_b)) in a.iter().zip(b.iter()).enumerate() {
            assert!((val_a - val_b).abs() < TOL, "Mismatch at index {}: {} vs {}", i, val_a, val_b);
        }
    }

    #[test]
    fn test_quantile_knots_no_internal() {
        let data = arr1(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let knots = quantile_knots(&data, 0, 3).unwrap();
        assert_arr_eq(&knots, &arr1(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]));
    }

    #[test]
    fn test_quantile_knots_median() {
        // candidates 2, 3, 4
        let data = arr1(&[1.0, 2.0, 3.0, 4.0, 10.0]);
        let knots = quantile_knots(&data, 1, 2).unwrap();
        assert_arr_eq(&knots, &arr1(&[1.0, 1.0, 3.0, 10.0, 10.0]));

        // candidates 2, 3, 4, 5: index 1.5 rounds up
        let data_even = arr1(&[1.0, 2.0, 3.0, 4.0, 5.0, 10.0]);
        let knots_even = quantile_knots(&data_even, 1, 2).unwrap();
        assert_arr_eq(&knots_even, &arr1(&[1.0, 1.0, 4.0, 10.0, 10.0]));
    }

    #[test]
    fn test_quantile_knots_two_internal() {
        let data = Array1::<f64>::range(1.0, 10.1, 1.0);
        let knots = quantile_knots(&data, 2, 3).unwrap();
        assert_arr_eq(&knots, &arr1(&[1.0, 1.0, 1.0, 4.0, 7.0, 10.0, 10.0, 10.0]));
    }

    #[test]
    fn test_quantile_knots_unsorted_with_duplicates() {
        let data = arr1(&[5.0, 1.0, 2.0, 2.0, 3.0, 4.0, 4.0, 4.0, 10.0]);
        let knots = quantile_knots(&data, 1, 2).unwrap();
        assert_arr_eq(&knots, &arr1(&[1.0, 1.0, 4.0, 10.0, 10.0]));
    }

    #[test]
    fn test_quantile_knots_rejects_bad_input() {
        assert!(quantile_knots(&arr1::<f64>(&[]), 1, 3).is_err());
        assert!(quantile_knots(&arr1(&[1.0, 2.0, 3.0]), 1, 0).is_err());
        assert!(quantile_knots(&arr1(&[1.0, 1.0, 1.0, 10.0, 10.0]), 1, 2).is_err());
        assert!(quantile_knots(&arr1(&[1.0, 2.0, 10.0]), 2, 2).is_err());
        assert!(quantile_knots(&arr1(&[5.0, 5.0, 5.0]), 1, 2).is_err());
        assert!(quantile_knots(&arr1(&[1.0, f64::NAN, 3.0]), 0, 2).is_err());
    }

    #[test]
    fn test_quantile_knots_identical_points() {
        let knots = quantile_knots(&arr1(&[5.0, 5.0, 5.0]), 0, 3).unwrap();
        assert_arr_eq(&knots, &arr1(&[5.0; 6]));
    }

    #[test]
    fn test_uniform_knots() {
        let knots = uniform_knots(1.0, 5.0, 0, 3).unwrap();
        assert_arr_eq(&knots, &arr1(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]));
        let knots = uniform_knots(0.0, 4.0, 3, 2).unwrap();
        assert_arr_eq(&knots, &arr1(&[0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0]));
        let knots = uniform_knots(5.0, 5.0, 0, 3).unwrap();
        assert_arr_eq(&knots, &arr1(&[5.0; 6]));
    }

    #[test]
    fn test_uniform_knots_errors() {
        assert!(uniform_knots(5.0, 5.0, 1, 3).is_err());
        assert!(uniform_knots(5.0, 1.0, 1, 3).is_err());
        assert!(uniform_knots(1.0, 5.0, 1, 0).is_err());
        assert!(uniform_knots(f64::NAN, 5.0, 1, 2).is_err());
    }

    #[test]
    fn test_validate_knots() {
        assert!(validate_knots(&arr1(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0]), 3).is_ok());
        assert!(validate_knots(&arr1(&[0.0, 0.0, 0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0, 1.0]), 4).is_ok());
        assert!(validate_knots(&arr1(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]), 3).is_ok());
    }

    #[test]
    fn test_validate_knots_errors() {
        assert!(matches!(
            validate_knots(&arr1(&[0.0, 0.0, 0.0, 2.0, 1.0, 3.0, 4.0, 4.0, 4.0]), 3),
            Err(BSplineError::InconsistentData(_))
        ));
        assert!(validate_knots(&arr1(&[0.0, 1.0, 2.0]), 0).is_err());
        assert!(validate_knots(&arr1(&[0.0, 1.0, 2.0]), 3).is_err());
        assert!(validate_knots(&arr1(&[0.0, 0.0, 0.0, 0.0]), 3).is_err());
        assert!(validate_knots(&arr1(&[0.0, 0.0, 0.0, 0.0, 1.0]), 3).is_err());
        assert!(validate_knots(&arr1(&[0.0, 1.0, 1.0, 1.0, 1.0]), 3).is_err());
    }
}
