//! Floating point tolerance checks.

/// Default tolerance for stochastic row-sum checks.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Absolute-difference comparison: `|a - b| <= tol`.
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= tol
}

/// Relative comparison scaled by the larger magnitude, falling back to an
/// absolute check near zero.
///
/// Useful for probabilities spanning many orders of magnitude, where a fixed
/// absolute tolerance is meaningless.
pub fn approx_eq_rel(a: f64, b: f64, rel: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs());
    if scale < f64::MIN_POSITIVE {
        return true;
    }
    (a - b).abs() <= rel * scale
}

/// Deviation of `sum(row)` from 1.0, or `None` when within `tol`.
pub fn row_sum_deviation(row: &[f64], tol: f64) -> Option<f64> {
    let sum: f64 = row.iter().sum();
    if approx_eq(sum, 1.0, tol) {
        None
    } else {
        Some(sum - 1.0)
    }
}
