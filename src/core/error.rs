//! Error type shared by every operation of the crate.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BSplineError>;

/// Named failure conditions of grid, support, spline and basis operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BSplineError {
    /// Supplied data contradicts itself, e.g. a grid that does not match the
    /// grid implied by a knot sequence, or grid points that are not strictly
    /// increasing.
    #[error("Inconsistent data: {0}")]
    InconsistentData(String),

    /// A requested B-spline is defined on a degenerate (zero-width) interval.
    #[error("B-spline is undetermined: {0}")]
    Undetermined(String),

    /// The operands are not defined on logically equal grids.
    #[error("The operands are defined on differing grids.")]
    DifferingGrids,

    /// Out-of-range access to a grid, support or knot sequence.
    #[error("Index {index} is out of bounds for a sequence of length {len}.")]
    InvalidAccess { index: usize, len: usize },

    /// Malformed argument, e.g. support bounds or too few knots.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The right-hand operand has a higher order than the target spline.
    #[error("Order mismatch: a spline of order {found} cannot be stored in a spline of order {expected}.")]
    OrderMismatch { expected: usize, found: usize },

    /// The quadratic program behind a fit did not reach an optimal solution.
    #[error("Solver did not find an optimal solution: {0}")]
    Solver(String),
}
