//! Shared primitives for the trellis HMM workspace.
//!
//! `trellis-core` provides the foundation the other trellis crates build on:
//!
//! - **Error types**: [`TrellisError`] and [`Result`] for structured error handling
//! - **Log-space numerics**: [`LogProb`] and log-sum-exp reductions
//! - **Tolerance checks**: approximate comparisons and row-sum deviation
//! - **Cancellation**: [`CancelToken`] for cooperative early exit

pub mod cancel;
pub mod error;
pub mod prob;
pub mod tolerance;

pub use cancel::CancelToken;
pub use error::{Result, TrellisError};
pub use prob::{log_sum_exp, log_sum_exp_iter, log_sum_exp_slice, LogProb};
pub use tolerance::{approx_eq, approx_eq_rel, row_sum_deviation, DEFAULT_TOLERANCE};
