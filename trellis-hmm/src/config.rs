//! Inference configuration.

use trellis_core::{CancelToken, Result, DEFAULT_TOLERANCE};

/// Tunable parameters shared by the parser and the trellis algorithms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct InferenceConfig {
    /// Allowed deviation of a row sum from 1 before
    /// [`parse_input`](crate::parse_input) raises a
    /// [`NumericWarning`](crate::NumericWarning).
    pub tolerance: f64,
    /// Minimum number of states before a trellis column is split across
    /// rayon workers. Only consulted with the `parallel` feature.
    pub parallel_min_states: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            parallel_min_states: 64,
        }
    }
}

impl InferenceConfig {
    /// Whether a trellis over `n_states` states runs its columns in parallel.
    pub fn use_parallel(&self, n_states: usize) -> bool {
        cfg!(feature = "parallel") && n_states >= self.parallel_min_states
    }
}

/// Per-call options for [`Model::forward_with`](crate::Model::forward_with)
/// and [`Model::viterbi_with`](crate::Model::viterbi_with).
#[derive(Debug, Clone, Default)]
pub struct InferenceOptions {
    pub config: InferenceConfig,
    pub cancel: Option<CancelToken>,
}

impl InferenceOptions {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Attach a token polled once per timestep.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn checkpoint(&self) -> Result<()> {
        match &self.cancel {
            Some(token) => token.checkpoint(),
            None => Ok(()),
        }
    }
}
