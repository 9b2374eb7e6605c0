//! Interpolation and least-squares fits in a B-spline basis.
//!
//! Both fits are posed as a quadratic program over `z = [c_0, ..., c_{n-1},
//! r_0, ..., r_{m-1}]`:
//!
//! ```text
//! min ½ Σ r_i²
//! s.t. Σ_j c_j B_j(x_i) - r_i = y_i    for i = 0..m
//! ```
//!
//! Interpolation additionally pins every residual `r_i` to zero.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use log::{debug, warn};
use ndarray::{Array1, Array2};

use crate::core::error::{BSplineError, Result};
use crate::core::generator::BSplineGenerator;
use crate::core::scalar::Scalar;
use crate::core::spline::Spline;
use crate::core::support::Support;

/// Solver settings for [`interpolate`] and [`fit_least_squares`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitSettings {
    /// Print solver progress.
    pub verbose: bool,
    pub max_iter: u32,
    /// Absolute duality gap tolerance.
    pub tol_gap_abs: f64,
    /// Relative duality gap tolerance.
    pub tol_gap_rel: f64,
    /// Feasibility tolerance.
    pub tol_feas: f64,
}

impl Default for FitSettings {
    fn default() -> Self {
        FitSettings {
            verbose: false,
            max_iter: 200,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            tol_feas: 1e-8,
        }
    }
}

impl FitSettings {
    fn solver_settings(&self) -> DefaultSettings<f64> {
        DefaultSettings {
            verbose: self.verbose,
            max_iter: self.max_iter,
            tol_gap_abs: self.tol_gap_abs,
            tol_gap_rel: self.tol_gap_rel,
            tol_feas: self.tol_feas,
            ..DefaultSettings::default()
        }
    }
}

/// Result of a fit.
#[derive(Debug, Clone)]
pub struct BasisFit {
    /// One coefficient per basis function.
    pub coefficients: Array1<f64>,
    /// `Σ_j coefficients[j] * basis[j]`.
    pub spline: Spline<f64>,
}

/// Finds the combination of `basis` passing through all points `(x_i, y_i)`.
///
/// # Arguments
/// * `basis` - Basis functions on a common grid.
/// * `x` - Interpolation nodes, exactly one per basis function.
/// * `y` - Values at the nodes.
///
/// # Returns
/// The fit, `InvalidArgument` on mismatched lengths, `DifferingGrids` if the
/// basis functions live on different grids, or `Solver` if the system could
/// not be solved (e.g. nodes violating the Schoenberg-Whitney condition).
pub fn interpolate(
    basis: &[Spline<f64>],
    x: &Array1<f64>,
    y: &Array1<f64>,
    settings: &FitSettings,
) -> Result<BasisFit> {
    if x.len() != basis.len() {
        return Err(BSplineError::InvalidArgument(format!(
            "Interpolation needs one node per basis function: {} nodes for {} functions.",
            x.len(),
            basis.len()
        )));
    }
    solve_fit(basis, x, y, settings, true)
}

/// Interpolates `y` at the grid points of `support` with a spline of order
/// `order`.
///
/// The basis is built from clamped knots: the boundary points are repeated
/// `order + 1` times, and the interior knots are the support points with
/// `order - 1` points next to the boundaries left out. This gives one basis
/// function per point and keeps every node inside the support of its basis
/// function. The resulting spline lives on the grid of `support`.
///
/// # Arguments
/// * `support` - Interpolation nodes, at least `order + 1` grid points.
/// * `y` - Values at the nodes.
/// * `order` - Order of the spline, at least 1.
///
/// # Returns
/// The fit, `InvalidArgument` if the order is zero, the lengths differ or
/// there are too few nodes, or `Solver` if the system could not be solved.
pub fn interpolate_on_support(
    support: &Support<f64>,
    y: &Array1<f64>,
    order: usize,
    settings: &FitSettings,
) -> Result<BasisFit> {
    let points = support.points();
    let (n, k) = (points.len(), order + 1);
    if order == 0 {
        return Err(BSplineError::InvalidArgument(
            "Interpolation on grid points needs an order of at least 1.".to_string(),
        ));
    }
    if y.len() != n {
        return Err(BSplineError::InvalidArgument(format!(
            "Got {} values for {} interpolation nodes.",
            y.len(),
            n
        )));
    }
    if n < k {
        return Err(BSplineError::InvalidArgument(format!(
            "{} nodes are too few for a spline of order {}.",
            n, order
        )));
    }

    let left = (k - 2) / 2;
    let right = k - 2 - left;
    let mut knots = Vec::with_capacity(n + k);
    knots.extend(std::iter::repeat(points[0]).take(k));
    knots.extend_from_slice(&points[1 + left..n - 1 - right]);
    knots.extend(std::iter::repeat(points[n - 1]).take(k));
    debug!("Interpolating {} points with {} knots", n, knots.len());

    let basis = BSplineGenerator::new(Array1::from(knots))?.generate_bsplines(k)?;
    let fit = interpolate(&basis, &Array1::from(points.to_vec()), y, settings)?;
    Ok(BasisFit {
        coefficients: fit.coefficients,
        spline: fit.spline.to_grid(support.grid().clone())?,
    })
}

/// Finds the combination of `basis` minimising the squared residuals at the
/// points `(x_i, y_i)`.
///
/// # Returns
/// The fit, `InvalidArgument` on mismatched lengths, `DifferingGrids` if the
/// basis functions live on different grids, or `Solver` if the solver did not
/// reach an optimal solution.
pub fn fit_least_squares(
    basis: &[Spline<f64>],
    x: &Array1<f64>,
    y: &Array1<f64>,
    settings: &FitSettings,
) -> Result<BasisFit> {
    solve_fit(basis, x, y, settings, false)
}

/// `Σ_j coefficients[j] * basis[j]`, of the highest order found in `basis`.
///
/// # Returns
/// The combination, `InvalidArgument` if the lengths differ or the basis is
/// empty, or `DifferingGrids` if the basis functions live on different grids.
pub fn linear_combination<T: Scalar>(basis: &[Spline<T>], coefficients: &[T]) -> Result<Spline<T>> {
    let Some(first) = basis.first() else {
        return Err(BSplineError::InvalidArgument("The basis is empty.".to_string()));
    };
    if basis.len() != coefficients.len() {
        return Err(BSplineError::InvalidArgument(format!(
            "Got {} coefficients for {} basis functions.",
            coefficients.len(),
            basis.len()
        )));
    }
    let order = basis.iter().map(Spline::order).max().unwrap_or(0);
    basis
        .iter()
        .zip(coefficients)
        .try_fold(Spline::zero(first.grid().clone(), order), |sum, (b, &c)| {
            sum.checked_add(&b.scaled(c))
        })
}

fn solve_fit(
    basis: &[Spline<f64>],
    x: &Array1<f64>,
    y: &Array1<f64>,
    settings: &FitSettings,
    exact: bool,
) -> Result<BasisFit> {
    if basis.is_empty() {
        return Err(BSplineError::InvalidArgument("The basis is empty.".to_string()));
    }
    if x.len() != y.len() {
        return Err(BSplineError::InvalidArgument(format!(
            "x and y must have the same length, got {} and {}.",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(BSplineError::InvalidArgument("No data points given.".to_string()));
    }
    if basis.iter().any(|b| !b.support().has_same_grid(basis[0].support())) {
        return Err(BSplineError::DifferingGrids);
    }

    let n = basis.len();
    let m = x.len();
    let total_vars = n + m;
    debug!(
        "Fitting {} basis functions to {} points ({})",
        n,
        m,
        if exact { "interpolation" } else { "least squares" }
    );

    let design = Array2::from_shape_fn((m, n), |(i, j)| basis[j].evaluate(x[i]));

    // ½ Σ r_i²
    let p_csc = CscMatrix::new(
        total_vars,
        total_vars,
        (0..=total_vars).map(|j| j.saturating_sub(n)).collect(),
        (n..total_vars).collect(),
        vec![1.0; m],
    );
    let q_vec = vec![0.0; total_vars];

    let mut a_triplets: Vec<(usize, usize, f64)> = Vec::new();
    let mut b_vec: Vec<f64> = Vec::with_capacity(2 * m);
    for (i, row) in design.outer_iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            if value != 0.0 {
                a_triplets.push((i, j, value));
            }
        }
        a_triplets.push((i, n + i, -1.0));
        b_vec.push(y[i]);
    }
    if exact {
        for i in 0..m {
            a_triplets.push((m + i, n + i, 1.0));
            b_vec.push(0.0);
        }
    }
    let num_constraints = b_vec.len();
    let a_csc = csc_from_triplets(num_constraints, total_vars, a_triplets);
    let cones = [SupportedConeT::ZeroConeT(num_constraints)];

    let mut solver = DefaultSolver::new(&p_csc, &q_vec, &a_csc, &b_vec, &cones, settings.solver_settings());
    solver.solve();

    match solver.solution.status {
        SolverStatus::Solved => {}
        SolverStatus::AlmostSolved => {
            warn!("Fit reached reduced accuracy only");
        }
        status => {
            return Err(BSplineError::Solver(format!("{:?}", status)));
        }
    }
    debug!("Fit finished with status {:?}", solver.solution.status);

    let coefficients: Vec<f64> = solver.solution.x.iter().take(n).copied().collect();
    let spline = linear_combination(basis, &coefficients)?;
    Ok(BasisFit {
        coefficients: Array1::from(coefficients),
        spline,
    })
}

/// Builds a CSC matrix from `(row, column, value)` triplets. Row indices in
/// each column end up sorted, as clarabel expects.
fn csc_from_triplets(m: usize, n: usize, mut triplets: Vec<(usize, usize, f64)>) -> CscMatrix<f64> {
    triplets.sort_unstable_by_key(|&(row, col, _)| (col, row));

    let mut colptr = vec![0; n + 1];
    for &(_, col, _) in &triplets {
        colptr[col + 1] += 1;
    }
    for j in 0..n {
        colptr[j + 1] += colptr[j];
    }

    let rowval = triplets.iter().map(|&(row, _, _)| row).collect();
    let nzval = triplets.iter().map(|&(_, _, value)| value).collect();
    CscMatrix::new(m, n, colptr, rowval, nzval)
}
