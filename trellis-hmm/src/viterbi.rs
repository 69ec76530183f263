//! Viterbi decoding: the single most probable hidden path.
//!
//! Max-product recurrence, evaluated in log-space:
//!
//! ```text
//! v[s][0] = e[s][x0]
//! v[s][t] = e[s][xt] * max_{s'} v[s'][t-1] * a[s'][s]      bt[s][t] = argmax
//! ```
//!
//! The uniform `1/S` initial factor scales every path equally, so it is left
//! out of the recurrence and only added back when reporting the joint
//! probability of the decoded path.
//!
//! Ties (equal candidate values) resolve to the lowest state index in the
//! model's declared order, both in the recurrence and at termination. Log
//! scores within a relative 1e-12 of each other count as equal, so products
//! that are equal in probability space stay tied after rounding.

use log::debug;
use trellis_core::{LogProb, Result, TrellisError};

use crate::config::InferenceOptions;
use crate::trellis::{argmax_first, fill_column};
use crate::Model;

/// A decoded hidden path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViterbiPath {
    /// State indices, one per observation.
    pub states: Vec<usize>,
    /// `ln(P(path) * P(sequence | path))`, including the `1/S` prior.
    pub log_probability: LogProb,
}

impl ViterbiPath {
    /// State labels of the path.
    pub fn labels<'m>(&self, model: &'m Model) -> Vec<&'m str> {
        self.states
            .iter()
            .filter_map(|&s| model.states().get(s))
            .collect()
    }

    /// The labels concatenated, e.g. `"AAAB"`.
    pub fn render(&self, model: &Model) -> String {
        self.labels(model).concat()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Model {
    /// Most probable hidden path for `sequence`.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Domain`] for an empty sequence or an unknown
    /// symbol.
    pub fn viterbi<S: AsRef<str>>(&self, sequence: &[S]) -> Result<ViterbiPath> {
        self.viterbi_with(sequence, &InferenceOptions::default())
    }

    /// [`viterbi`](Self::viterbi) with explicit options.
    ///
    /// # Errors
    ///
    /// Additionally returns [`TrellisError::Cancelled`] if the token in
    /// `options` fires before decoding completes.
    pub fn viterbi_with<S: AsRef<str>>(
        &self,
        sequence: &[S],
        options: &InferenceOptions,
    ) -> Result<ViterbiPath> {
        let observations = self.encode_symbols(sequence)?;
        self.viterbi_encoded(&observations, options)
    }

    /// [`viterbi_with`](Self::viterbi_with) over symbol indices.
    pub fn viterbi_encoded(
        &self,
        observations: &[usize],
        options: &InferenceOptions,
    ) -> Result<ViterbiPath> {
        let Some((&first, rest)) = observations.split_first() else {
            return Err(TrellisError::domain("observed sequence is empty"));
        };
        self.alphabet().check_indices(observations)?;

        let n = self.n_states();
        let parallel = options.config.use_parallel(n);
        debug!(
            "viterbi: {} states x {} steps ({})",
            n,
            observations.len(),
            if parallel { "parallel" } else { "sequential" }
        );

        let mut column: Vec<f64> = (0..n).map(|s| self.log_emission(s, first)).collect();
        // backtrack[t - 1][s]: best predecessor of state s at step t
        let mut backtrack: Vec<Vec<usize>> = Vec::with_capacity(rest.len());

        for &symbol in rest {
            options.checkpoint()?;
            let prev = &column;
            let cells = fill_column(n, parallel, |s| {
                let (from, score) =
                    argmax_first((0..n).map(|from| prev[from] + self.log_transition(from, s)));
                (score + self.log_emission(s, symbol), from)
            });
            let (scores, pointers): (Vec<f64>, Vec<usize>) = cells.into_iter().unzip();
            column = scores;
            backtrack.push(pointers);
        }

        let (last, best) = argmax_first(column.iter().copied());

        let mut states = vec![0usize; observations.len()];
        states[observations.len() - 1] = last;
        for t in (1..observations.len()).rev() {
            states[t - 1] = backtrack[t - 1][states[t]];
        }

        Ok(ViterbiPath {
            states,
            log_probability: LogProb(best + self.log_initial()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        Model::from_rows(
            &["A", "B"],
            &["x", "y", "z"],
            &[vec![0.641, 0.359], vec![0.729, 0.271]],
            &[vec![0.117, 0.691, 0.192], vec![0.097, 0.42, 0.483]],
        )
        .unwrap()
    }

    fn chars(s: &str) -> Vec<String> {
        s.chars().map(String::from).collect()
    }

    #[test]
    fn decodes_textbook_example() {
        let model = model();
        let path = model.viterbi(&chars("xyxzzxyxyy")).unwrap();
        assert_eq!(path.render(&model), "AAABBAAAAA");
        assert_eq!(path.len(), 10);
    }

    #[test]
    fn reported_probability_matches_joint() {
        let model = model();
        let seq = chars("zzyxyz");
        let decoded = model.viterbi(&seq).unwrap();
        let labels = decoded.labels(&model);
        let joint = model.path_probability(&labels).unwrap()
            * model.conditional_emission_probability(&seq, &labels).unwrap();
        assert!((decoded.log_probability.to_prob() - joint).abs() < 1e-12);
    }

    #[test]
    fn ties_resolve_to_lowest_state_index() {
        let model = Model::from_rows(
            &["A", "B", "C"],
            &["x"],
            &[vec![1.0 / 3.0; 3], vec![1.0 / 3.0; 3], vec![1.0 / 3.0; 3]],
            &[vec![0.5], vec![0.5], vec![0.5]],
        )
        .unwrap();
        let path = model.viterbi(&["x", "x", "x", "x"]).unwrap();
        assert_eq!(path.render(&model), "AAAA");
    }

    #[test]
    fn ties_in_probability_space_survive_log_rounding() {
        // AA and BA both score 0.028; their log sums differ in the last ulp
        let model = Model::from_rows(
            &["A", "B"],
            &["x", "y", "z"],
            &[vec![0.35, 0.65], vec![0.7, 0.3]],
            &[vec![0.2, 0.8, 0.0], vec![0.1, 0.1, 0.8]],
        )
        .unwrap();
        assert_eq!(0.2 * 0.35, 0.1 * 0.7);
        let path = model.viterbi(&["x", "y"]).unwrap();
        assert_eq!(path.render(&model), "AA");
    }

    #[test]
    fn impossible_sequence_still_decodes_deterministically() {
        let model = Model::from_rows(
            &["A", "B"],
            &["x", "y"],
            &[vec![0.5, 0.5], vec![0.5, 0.5]],
            &[vec![1.0, 0.0], vec![1.0, 0.0]],
        )
        .unwrap();
        let path = model.viterbi(&["y", "y"]).unwrap();
        assert_eq!(path.states, vec![0, 0]);
        assert!(path.log_probability.is_impossible());
    }

    #[test]
    fn rejects_empty_and_unknown() {
        let model = model();
        let empty: [&str; 0] = [];
        assert!(matches!(model.viterbi(&empty), Err(TrellisError::Domain(_))));
        assert!(matches!(model.viterbi(&["x", "q"]), Err(TrellisError::Domain(_))));
    }
}
