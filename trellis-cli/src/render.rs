//! Result formatting.

/// Probabilities below this are written in scientific notation.
const SCIENTIFIC_BELOW: f64 = 1e-4;

/// Shortest round-trip rendering: plain decimal for ordinary values,
/// scientific notation for small non-zero ones (`3.59e-6`).
pub fn probability(p: f64) -> String {
    if p != 0.0 && p.abs() < SCIENTIFIC_BELOW {
        format!("{p:e}")
    } else {
        format!("{p}")
    }
}
