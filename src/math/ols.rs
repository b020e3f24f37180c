//! Least squares solver.
//!
//! The projection engine solves many small regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! where each row `x_i` is a polynomial basis row for one day of history.
//!
//! Implementation choices:
//! - SVD rather than QR: the design matrix is tall (more days than
//!   coefficients), and nalgebra's `QR::solve` expects square systems.
//! - Matrices are tiny (at most a few dozen rows, 5 columns), so SVD cost is
//!   negligible even when every day of a long series is used as an anchor.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() < x.ncols() {
        return None;
    }

    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
