//! Probability of an observed sequence given a fixed hidden path.

use trellis_core::{Result, TrellisError};

use crate::Model;

impl Model {
    /// `P(sequence | path) = prod emission[path[i]][sequence[i]]`.
    ///
    /// An empty sequence with an empty path is the empty product, `1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Domain`] if the lengths differ or a label is
    /// not declared.
    pub fn conditional_emission_probability<S: AsRef<str>, P: AsRef<str>>(
        &self,
        sequence: &[S],
        path: &[P],
    ) -> Result<f64> {
        check_lengths(sequence.len(), path.len())?;
        let sequence = self.encode_symbols(sequence)?;
        let path = self.encode_states(path)?;
        self.conditional_emission_probability_encoded(&sequence, &path)
    }

    /// [`conditional_emission_probability`](Self::conditional_emission_probability)
    /// over indices.
    pub fn conditional_emission_probability_encoded(
        &self,
        sequence: &[usize],
        path: &[usize],
    ) -> Result<f64> {
        check_lengths(sequence.len(), path.len())?;
        self.alphabet().check_indices(sequence)?;
        self.states().check_indices(path)?;

        Ok(path
            .iter()
            .zip(sequence)
            .map(|(&state, &symbol)| self.emission(state, symbol))
            .product())
    }
}

fn check_lengths(sequence: usize, path: usize) -> Result<()> {
    if sequence != path {
        return Err(TrellisError::domain(format!(
            "sequence length {sequence} does not match hidden path length {path}"
        )));
    }
    Ok(())
}
