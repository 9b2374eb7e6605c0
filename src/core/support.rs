use std::ops::Index;

use crate::core::error::{BSplineError, Result};
use crate::core::grid::Grid;
use crate::core::scalar::Scalar;

/// A contiguous window `[start_index, end_index)` of grid points of a global
/// [`Grid`], describing where a spline may be nonzero.
///
/// A support holding `n` grid points represents `n - 1` intervals. Interval
/// indices relative to the global grid are called *absolute*, indices
/// relative to the first interval of the support *relative*.
#[derive(Debug, Clone)]
pub struct Support<T: Scalar> {
    grid: Grid<T>,
    start_index: usize,
    end_index: usize,
}

impl<T: Scalar> Support<T> {
    /// Constructs the support `[start_index, end_index)` on `grid`.
    ///
    /// # Returns
    /// The support, or `InvalidArgument` if `end_index < start_index` or
    /// `end_index > grid.len()`.
    pub fn new(grid: Grid<T>, start_index: usize, end_index: usize) -> Result<Self> {
        if end_index < start_index || end_index > grid.len() {
            return Err(BSplineError::InvalidArgument(format!(
                "Support bounds [{}, {}) are invalid for a grid of {} points.",
                start_index,
                end_index,
                grid.len()
            )));
        }
        Ok(Support { grid, start_index, end_index })
    }

    /// Support covering the whole grid.
    pub fn whole_grid(grid: Grid<T>) -> Self {
        let end_index = grid.len();
        Support { grid, start_index: 0, end_index }
    }

    /// Empty support on `grid`.
    pub fn empty(grid: Grid<T>) -> Self {
        Support { grid, start_index: 0, end_index: 0 }
    }

    /// Number of grid points in the support.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// False for empty and point-like supports.
    pub fn contains_intervals(&self) -> bool {
        self.len() > 1
    }

    pub fn number_of_intervals(&self) -> usize {
        self.len().saturating_sub(1)
    }

    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// Translates an absolute grid index into an index relative to this
    /// support, or `None` if it lies outside `[start_index, end_index)`.
    pub fn relative_from_absolute(&self, absolute_index: usize) -> Option<usize> {
        if absolute_index >= self.start_index && absolute_index < self.end_index {
            Some(absolute_index - self.start_index)
        } else {
            None
        }
    }

    /// Translates an index relative to this support into an absolute grid index.
    ///
    /// # Returns
    /// The absolute index, or `InvalidAccess` if `relative_index >= len()`.
    pub fn absolute_from_relative(&self, relative_index: usize) -> Result<usize> {
        if relative_index >= self.len() {
            return Err(BSplineError::InvalidAccess {
                index: relative_index,
                len: self.len(),
            });
        }
        Ok(relative_index + self.start_index)
    }

    /// Index of the interval of this support that corresponds to the absolute
    /// interval `[grid[i], grid[i + 1]]`, or `None` if it is not covered.
    pub fn interval_index_from_absolute(&self, absolute_interval: usize) -> Option<usize> {
        if absolute_interval >= self.start_index && absolute_interval + 1 < self.end_index {
            Some(absolute_interval - self.start_index)
        } else {
            None
        }
    }

    /// Bounds-checked access to the `i`th grid point of the support.
    pub fn at(&self, i: usize) -> Result<T> {
        if i >= self.len() {
            return Err(BSplineError::InvalidAccess { index: i, len: self.len() });
        }
        self.grid.at(self.start_index + i)
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

    /// Grid points of the support.
    pub fn points(&self) -> &[T] {
        &self.grid.as_slice()[self.start_index..self.end_index]
    }

    /// Finds the relative index of the interval containing `x` by bisection.
    /// Interior grid points belong to the interval on their left, the first
    /// point to the first interval.
    pub fn find_interval(&self, x: T) -> Option<usize> {
        let points = self.points();
        if points.len() < 2 || x < points[0] || x > points[points.len() - 1] {
            return None;
        }
        let (mut start, mut end) = (0usize, points.len() - 1);
        while end - start > 1 {
            let middle = (start + end) / 2;
            if x > points[middle] {
                start = middle;
            } else {
                end = middle;
            }
        }
        Some(start)
    }

    /// Checks whether both supports are defined on logically equal grids.
    pub fn has_same_grid(&self, other: &Support<T>) -> bool {
        self.grid == other.grid
    }

    /// Smallest contiguous support containing both supports. An empty
    /// operand acts as identity.
    ///
    /// # Returns
    /// The union, or `DifferingGrids` if the grids are not equal.
    pub fn calc_union(&self, other: &Support<T>) -> Result<Support<T>> {
        if !self.has_same_grid(other) {
            return Err(BSplineError::DifferingGrids);
        }
        Ok(match (self.is_empty(), other.is_empty()) {
            (true, true) => Support::empty(self.grid.clone()),
            (true, false) => other.clone(),
            (false, true) => self.clone(),
            (false, false) => Support {
                grid: self.grid.clone(),
                start_index: self.start_index.min(other.start_index),
                end_index: self.end_index.max(other.end_index),
            },
        })
    }

    /// Intersection of both supports; empty if they do not overlap.
    ///
    /// # Returns
    /// The intersection, or `DifferingGrids` if the grids are not equal.
    pub fn calc_intersection(&self, other: &Support<T>) -> Result<Support<T>> {
        if !self.has_same_grid(other) {
            return Err(BSplineError::DifferingGrids);
        }
        let start_index = self.start_index.max(other.start_index);
        let end_index = self.end_index.min(other.end_index);
        if start_index >= end_index {
            return Ok(Support::empty(self.grid.clone()));
        }
        Ok(Support { grid: self.grid.clone(), start_index, end_index })
    }

    /// Support reflected through zero: the grid is negated and reversed.
    /// If the reflected grid equals the original one, the original grid is
    /// reused.
    pub(crate) fn reflect(&self) -> Support<T> {
        let reflected: Vec<T> = self.grid.iter().rev().map(|&x| -x).collect();
        let grid = if reflected[..] == self.grid.as_slice()[..] {
            self.grid.clone()
        } else {
            Grid::from_increasing(reflected)
        };
        if self.is_empty() {
            return Support::empty(grid);
        }
        let n = grid.len();
        Support {
            grid,
            start_index: n - self.end_index,
            end_index: n - self.start_index,
        }
    }
}

impl<T: Scalar> PartialEq for Support<T> {
    fn eq(&self, other: &Self) -> bool {
        self.has_same_grid(other)
            && ((self.start_index == other.start_index && self.end_index == other.end_index)
                || (self.is_empty() && other.is_empty()))
    }
}

impl<T: Scalar> Index<usize> for Support<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.grid[self.start_index + i]
    }
}
