//! Forward algorithm: total likelihood of an observed sequence.
//!
//! The sum-product recurrence over the trellis is
//!
//! ```text
//! f[s][0] = 1/S * e[s][x0]
//! f[s][t] = e[s][xt] * sum_{s'} f[s'][t-1] * a[s'][s]
//! P(x)    = sum_s f[s][T-1]
//! ```
//!
//! and is evaluated entirely in natural-log space, with log-sum-exp as the
//! inner reduction. Only the previous column is kept, so memory is `O(S)`.

use log::debug;
use trellis_core::{log_sum_exp_iter, log_sum_exp_slice, LogProb, Result, TrellisError};

use crate::config::InferenceOptions;
use crate::trellis::fill_column;
use crate::Model;

/// Output of the forward algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForwardResult {
    /// `ln P(sequence)`.
    pub log_likelihood: LogProb,
}

impl ForwardResult {
    /// `P(sequence)`. Underflows to 0 where the log value is below about -745.
    pub fn probability(&self) -> f64 {
        self.log_likelihood.to_prob()
    }
}

impl Model {
    /// Total probability of `sequence`, summed over every hidden path of the
    /// same length, with a uniform initial distribution.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Domain`] for an empty sequence or an unknown
    /// symbol.
    pub fn forward<S: AsRef<str>>(&self, sequence: &[S]) -> Result<ForwardResult> {
        self.forward_with(sequence, &InferenceOptions::default())
    }

    /// [`forward`](Self::forward) with explicit options (parallel threshold,
    /// cancellation).
    ///
    /// # Errors
    ///
    /// Additionally returns [`TrellisError::Cancelled`] if the token in
    /// `options` fires before the last column is complete.
    pub fn forward_with<S: AsRef<str>>(
        &self,
        sequence: &[S],
        options: &InferenceOptions,
    ) -> Result<ForwardResult> {
        let observations = self.encode_symbols(sequence)?;
        self.forward_encoded(&observations, options)
    }

    /// [`forward_with`](Self::forward_with) over symbol indices.
    pub fn forward_encoded(
        &self,
        observations: &[usize],
        options: &InferenceOptions,
    ) -> Result<ForwardResult> {
        let Some((&first, rest)) = observations.split_first() else {
            return Err(TrellisError::domain("observed sequence is empty"));
        };
        self.alphabet().check_indices(observations)?;

        let n = self.n_states();
        let parallel = options.config.use_parallel(n);
        debug!(
            "forward: {} states x {} steps ({})",
            n,
            observations.len(),
            if parallel { "parallel" } else { "sequential" }
        );

        let log_initial = self.log_initial();
        let mut column: Vec<f64> = (0..n)
            .map(|s| log_initial + self.log_emission(s, first))
            .collect();

        for &symbol in rest {
            options.checkpoint()?;
            let prev = &column;
            let next = fill_column(n, parallel, |s| {
                let incoming =
                    log_sum_exp_iter((0..n).map(|from| prev[from] + self.log_transition(from, s)));
                incoming + self.log_emission(s, symbol)
            });
            column = next;
        }

        Ok(ForwardResult {
            log_likelihood: LogProb(log_sum_exp_slice(&column)),
        })
    }
}
