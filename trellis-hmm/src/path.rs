//! Probability of a hidden state path.

use trellis_core::{Result, TrellisError};

use crate::Model;

impl Model {
    /// Probability of `path` under the transition matrix and a uniform
    /// initial distribution: `1/S * prod transition[path[i-1]][path[i]]`.
    ///
    /// Computed as a plain product, so very long paths may underflow to 0.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Domain`] for an empty path or an unknown state.
    pub fn path_probability<S: AsRef<str>>(&self, path: &[S]) -> Result<f64> {
        let path = self.encode_states(path)?;
        self.path_probability_encoded(&path)
    }

    /// [`path_probability`](Self::path_probability) over state indices.
    pub fn path_probability_encoded(&self, path: &[usize]) -> Result<f64> {
        if path.is_empty() {
            return Err(TrellisError::domain("hidden path is empty"));
        }
        self.states().check_indices(path)?;

        let initial = 1.0 / self.n_states() as f64;
        Ok(path
            .windows(2)
            .fold(initial, |p, w| p * self.transition(w[0], w[1])))
    }
}
