//! Non-fatal numeric diagnostics.

use std::fmt;

/// Which table a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatrixKind {
    Transition,
    Emission,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixKind::Transition => f.write_str("transition"),
            MatrixKind::Emission => f.write_str("emission"),
        }
    }
}

/// A matrix row whose probabilities do not sum to 1 within tolerance.
///
/// Inference proceeds with the values as given.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericWarning {
    pub matrix: MatrixKind,
    /// Label of the source state owning the row.
    pub state: String,
    pub sum: f64,
    pub tolerance: f64,
}

impl NumericWarning {
    pub fn new(matrix: MatrixKind, state: impl Into<String>, sum: f64, tolerance: f64) -> Self {
        Self {
            matrix,
            state: state.into(),
            sum,
            tolerance,
        }
    }
}

impl fmt::Display for NumericWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row '{}' sums to {} (expected 1 within {:e})",
            self.matrix, self.state, self.sum, self.tolerance
        )
    }
}
