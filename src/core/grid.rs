use std::ops::Index;
use std::sync::Arc;

use ndarray::Array1;

use crate::core::error::{BSplineError, Result};
use crate::core::scalar::Scalar;

/// The global grid: a strictly increasing sequence of breakpoints shared by
/// every support and spline defined on it.
///
/// Cloning a grid only clones the reference to its data. Two grids compare
/// equal if they share their data or hold element-wise equal points.
#[derive(Debug, Clone)]
pub struct Grid<T: Scalar> {
    data: Arc<[T]>,
}

impl<T: Scalar> Grid<T> {
    /// Constructs a grid from its points.
    ///
    /// # Arguments
    /// * `points` - Grid points; must be strictly increasing.
    ///
    /// # Returns
    /// The grid, or `InconsistentData` if the points are not strictly increasing.
    pub fn new(points: Vec<T>) -> Result<Self> {
        if let Some(i) = (1..points.len()).find(|&i| !(points[i - 1] < points[i])) {
            return Err(BSplineError::InconsistentData(format!(
                "Grid points are not strictly increasing at index {} ({:?} >= {:?}).",
                i,
                points[i - 1],
                points[i]
            )));
        }
        Ok(Grid { data: Arc::from(points) })
    }

    /// Wraps points already known to be strictly increasing.
    pub(crate) fn from_increasing(points: Vec<T>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0] < w[1]));
        Grid { data: Arc::from(points) }
    }

    /// Constructs the grid implied by a knot sequence by dropping repeated knots.
    ///
    /// # Arguments
    /// * `knots` - Non-decreasing knot sequence; repeated knots are allowed.
    ///
    /// # Returns
    /// The deduplicated grid, or `InconsistentData` if the knots decrease somewhere.
    pub fn from_knots(knots: &Array1<T>) -> Result<Self> {
        let mut points: Vec<T> = Vec::with_capacity(knots.len());
        for &knot in knots.iter() {
            match points.last() {
                Some(&last) if knot == last => {}
                Some(&last) if knot < last => {
                    return Err(BSplineError::InconsistentData(format!(
                        "Knot sequence is decreasing ({:?} after {:?}).",
                        knot, last
                    )));
                }
                _ => points.push(knot),
            }
        }
        Grid::new(points)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked access to the `i`th grid point.
    pub fn at(&self, i: usize) -> Result<T> {
        self.data.get(i).copied().ok_or(BSplineError::InvalidAccess {
            index: i,
            len: self.len(),
        })
    }

    pub fn front(&self) -> Result<T> {
        self.at(0)
    }

    pub fn back(&self) -> Result<T> {
        match self.len() {
            0 => Err(BSplineError::InvalidAccess { index: 0, len: 0 }),
            n => self.at(n - 1),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Returns the index of the grid point equal to `x`.
    ///
    /// # Returns
    /// The index, or `InconsistentData` if `x` is not a grid point.
    pub fn find_element(&self, x: T) -> Result<usize> {
        let idx = self.data.partition_point(|&p| p < x);
        if idx < self.len() && self.data[idx] == x {
            Ok(idx)
        } else {
            Err(BSplineError::InconsistentData(format!(
                "{:?} is not an element of the grid.",
                x
            )))
        }
    }

    /// True if both grids share the same underlying allocation.
    pub fn shares_data_with(&self, other: &Grid<T>) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl<T: Scalar> PartialEq for Grid<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.shares_data_with(other) {
            return true;
        }
        self.data[..] == other.data[..]
    }
}

impl<T: Scalar> Index<usize> for Grid<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<'a, T: Scalar> IntoIterator for &'a Grid<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
