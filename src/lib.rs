//! Piecewise polynomial splines on a shared one-dimensional grid.
//!
//! Splines are stored as per-interval polynomials around the interval
//! midpoints, which makes sums, products, derivatives and integrals of splines
//! on the same [`Grid`] exact. [`BSplineGenerator`] builds B-spline bases from
//! knot sequences with the Cox-de Boor recursion.
//!
//! ```
//! use bspline_rs::{BSplineGenerator, integration};
//! use ndarray::arr1;
//!
//! let knots = arr1(&[0.0, 0.0, 0.5, 1.0, 1.0]);
//! let basis = BSplineGenerator::new(knots)?.generate_bsplines(2)?;
//! assert_eq!(basis.len(), 3);
//!
//! let product = &basis[0] * &basis[1];
//! assert_eq!(product.order(), 2);
//! assert!(integration::overlap(&basis[0], &basis[1])? > 0.0);
//! # Ok::<(), bspline_rs::BSplineError>(())
//! ```

pub mod core;

pub use crate::core::error::{BSplineError, Result};
pub use crate::core::generator::BSplineGenerator;
pub use crate::core::grid::Grid;
pub use crate::core::integration;
pub use crate::core::interpolation::{
    fit_least_squares, interpolate, interpolate_on_support, linear_combination, BasisFit, FitSettings,
};
pub use crate::core::knots::{quantile_knots, uniform_knots, validate_knots};
pub use crate::core::quadrature::{integrate_numerically, GaussLegendre};
pub use crate::core::scalar::Scalar;
pub use crate::core::spline::Spline;
pub use crate::core::support::Support;
