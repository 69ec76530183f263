//! Log-space probability arithmetic.
//!
//! [`LogProb`] stores a probability as its natural logarithm so that long
//! products of small factors become sums and do not underflow. Zero
//! probabilities are allowed and map to negative infinity.

use crate::{Result, TrellisError};

/// A probability stored as its natural logarithm: `ln(p)`.
///
/// `0.0` is certainty and negative infinity is impossibility.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogProb(pub f64);

impl LogProb {
    /// Create a [`LogProb`] from a raw probability in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Domain`] if `p` is outside `[0, 1]` or NaN.
    pub fn from_prob(p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(TrellisError::domain(format!(
                "probability {p} is outside [0, 1]"
            )));
        }
        Ok(Self(p.ln()))
    }

    /// Convert back to a raw probability.
    pub fn to_prob(self) -> f64 {
        self.0.exp()
    }

    /// Log-sum-exp: `ln(exp(self) + exp(other))` without overflow.
    pub fn ln_add(self, other: Self) -> Self {
        Self(log_sum_exp(self.0, other.0))
    }

    /// Multiply two probabilities in log-space.
    pub fn ln_mul(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Whether this is the impossible event.
    pub fn is_impossible(self) -> bool {
        self.0 == f64::NEG_INFINITY
    }

    /// Certain event: `ln(1) = 0`.
    pub const fn certain() -> Self {
        Self(0.0)
    }

    /// Impossible event: `ln(0) = -inf`.
    pub const fn impossible() -> Self {
        Self(f64::NEG_INFINITY)
    }
}

/// Numerically stable `ln(exp(a) + exp(b))`.
pub fn log_sum_exp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (max, min) = if a >= b { (a, b) } else { (b, a) };
    max + (min - max).exp().ln_1p()
}

/// Log-sum-exp over an iterator of log values.
///
/// Two-pass: find the maximum, then sum the shifted exponentials. Returns
/// negative infinity for an empty input or when every term is impossible.
pub fn log_sum_exp_iter<I>(xs: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = xs.into_iter();
    let max = iter.clone().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let sum: f64 = iter.map(|x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Log-sum-exp over a slice.
pub fn log_sum_exp_slice(xs: &[f64]) -> f64 {
    log_sum_exp_iter(xs.iter().copied())
}
