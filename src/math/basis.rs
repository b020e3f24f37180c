//! Polynomial basis for trend fitting.
//!
//! A fit of degree `d` uses the monomial basis `1, x, x^2, ..., x^d`. Callers
//! should keep `x` on a unit scale (e.g. day index divided by window length);
//! raw day indices raised to the fourth power make the design matrix badly
//! conditioned.

use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

/// Fill a design row `[1, x, x^2, ..., x^degree]`.
///
/// # Panics
/// Panics if `out.len() != degree + 1`. Callers should size the row correctly.
pub fn fill_design_row(degree: usize, x: f64, out: &mut [f64]) {
    assert_eq!(out.len(), degree + 1, "design row must hold degree + 1 terms");
    let mut term = 1.0;
    for slot in out.iter_mut() {
        *slot = term;
        term *= x;
    }
}

/// Evaluate a polynomial given coefficients in ascending order (Horner's rule).
pub fn eval_polynomial(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Least-squares polynomial fit of `ys` against `xs`.
///
/// Returns coefficients in ascending order, or `None` when the inputs cannot
/// determine a polynomial of this degree (mismatched lengths, fewer than
/// `degree + 1` distinct abscissae, or an unsolvable system).
pub fn fit_polynomial(xs: &[f64], ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    if xs.len() != ys.len() || distinct_count(xs) < degree + 1 {
        return None;
    }

    let cols = degree + 1;
    let mut design = DMatrix::<f64>::zeros(xs.len(), cols);
    let mut row = vec![0.0; cols];
    for (i, &x) in xs.iter().enumerate() {
        fill_design_row(degree, x, &mut row);
        for (j, &v) in row.iter().enumerate() {
            design[(i, j)] = v;
        }
    }
    let target = DVector::from_column_slice(ys);

    solve_least_squares(&design, &target).map(|beta| beta.iter().copied().collect())
}

fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_row_powers() {
        let mut row = [0.0; 4];
        fill_design_row(3, 2.0, &mut row);
        assert_eq!(row, [1.0, 2.0, 4.0, 8.0]);
    }

    #[test]
    fn horner_matches_expansion() {
        // 1 + 2x + 3x^2 at x = 2
        assert!((eval_polynomial(&[1.0, 2.0, 3.0], 2.0) - 17.0).abs() < 1e-12);
        assert_eq!(eval_polynomial(&[], 5.0), 0.0);
    }

    #[test]
    fn recovers_exact_cubic() {
        let xs: Vec<f64> = (0..15).map(|i| i as f64 / 14.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 5.0 - x + 2.0 * x * x + 0.5 * x * x * x).collect();

        let coeffs = fit_polynomial(&xs, &ys, 3).unwrap();
        for (got, want) in coeffs.iter().zip([5.0, -1.0, 2.0, 0.5]) {
            assert!((got - want).abs() < 1e-8, "got {got}, want {want}");
        }
    }

    #[test]
    fn degenerate_abscissae_are_rejected() {
        let xs = [1.0, 1.0, 1.0, 1.0];
        let ys = [1.0, 2.0, 3.0, 4.0];
        assert!(fit_polynomial(&xs, &ys, 1).is_none());
        assert!(fit_polynomial(&[0.0, 1.0], &[1.0], 1).is_none());
    }
}
