//! The immutable HMM container and its label lookup tables.

use std::collections::HashMap;
use std::fmt;

use trellis_core::{row_sum_deviation, Result, TrellisError};

use crate::diagnostics::{MatrixKind, NumericWarning};

// ---------------------------------------------------------------------------
// LabelSet
// ---------------------------------------------------------------------------

/// What a [`LabelSet`] names. Used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    State,
    Symbol,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::State => f.write_str("state"),
            LabelKind::Symbol => f.write_str("symbol"),
        }
    }
}

/// An ordered set of distinct labels with a name-to-index lookup.
///
/// Declaration order is the index order. It drives matrix layout and the
/// Viterbi tie-break, so it never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    kind: LabelKind,
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelSet {
    /// Build a label set, rejecting duplicates and empty labels.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Parse`] if a label is empty or repeated.
    pub fn new<I, S>(kind: LabelKind, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if label.is_empty() {
                return Err(TrellisError::parse(format!("empty {kind} label at index {i}")));
            }
            if index.insert(label.clone(), i).is_some() {
                return Err(TrellisError::parse(format!("duplicate {kind} label '{label}'")));
            }
        }
        Ok(Self {
            kind,
            labels,
            index,
        })
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at index `i`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.labels.get(i).map(String::as_str)
    }

    /// Index of `label`, if declared.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Labels in declaration order.
    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// True when every label is exactly one character, so a query like
    /// `"xyxz"` can be split per character.
    pub fn all_single_char(&self) -> bool {
        self.labels.iter().all(|l| l.chars().count() == 1)
    }

    /// Translate labels to indices.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Domain`] naming the first unknown label and
    /// its position.
    pub fn encode<S: AsRef<str>>(&self, items: &[S]) -> Result<Vec<usize>> {
        items
            .iter()
            .enumerate()
            .map(|(pos, item)| {
                let item = item.as_ref();
                self.index_of(item).ok_or_else(|| {
                    TrellisError::domain(format!(
                        "unknown {} '{item}' at position {pos}",
                        self.kind
                    ))
                })
            })
            .collect()
    }

    /// Check that already-encoded indices are in range.
    pub(crate) fn check_indices(&self, indices: &[usize]) -> Result<()> {
        match indices.iter().position(|&i| i >= self.len()) {
            Some(pos) => Err(TrellisError::domain(format!(
                "{} index {} at position {pos} out of range ({} declared)",
                self.kind,
                indices[pos],
                self.len()
            ))),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A discrete hidden Markov model with a uniform initial distribution.
///
/// Matrices are stored row-major over label indices:
/// `transition[i * n_states + j] = P(j | i)` and
/// `emission[i * n_symbols + k] = P(symbol k | state i)`. Natural-log copies
/// of both tables are computed once at construction for the trellis
/// algorithms.
///
/// Rows are not required to be stochastic; see
/// [`row_sum_warnings`](Self::row_sum_warnings).
#[derive(Debug, Clone)]
pub struct Model {
    states: LabelSet,
    alphabet: LabelSet,
    transition: Vec<f64>,
    emission: Vec<f64>,
    log_transition: Vec<f64>,
    log_emission: Vec<f64>,
}

impl Model {
    /// Create a model from label sets and flat row-major matrices.
    ///
    /// The alphabet may be empty (a model used only for path probabilities),
    /// in which case `emission` must be empty too.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Parse`] if:
    /// - there are no states, or a label set has the wrong kind
    /// - a matrix length does not match the declared dimensions
    /// - any entry is negative, NaN or infinite
    pub fn new(
        states: LabelSet,
        alphabet: LabelSet,
        transition: Vec<f64>,
        emission: Vec<f64>,
    ) -> Result<Self> {
        if states.kind() != LabelKind::State || alphabet.kind() != LabelKind::Symbol {
            return Err(TrellisError::parse(
                "model needs a state label set and a symbol label set",
            ));
        }
        let n = states.len();
        let m = alphabet.len();
        if n == 0 {
            return Err(TrellisError::parse("model has no states"));
        }
        if transition.len() != n * n {
            return Err(TrellisError::parse(format!(
                "transition matrix has {} entries, expected {n}x{n}",
                transition.len()
            )));
        }
        if emission.len() != n * m {
            return Err(TrellisError::parse(format!(
                "emission matrix has {} entries, expected {n}x{m}",
                emission.len()
            )));
        }
        check_entries(MatrixKind::Transition, &transition, n, &states)?;
        check_entries(MatrixKind::Emission, &emission, m, &states)?;

        let log_transition = transition.iter().map(|p| p.ln()).collect();
        let log_emission = emission.iter().map(|p| p.ln()).collect();

        Ok(Self {
            states,
            alphabet,
            transition,
            emission,
            log_transition,
            log_emission,
        })
    }

    /// Convenience constructor from label slices and nested rows.
    ///
    /// `transition[i][j]` and `emission[i][k]` follow the declared order of
    /// `states` and `alphabet`.
    pub fn from_rows<S: AsRef<str>, A: AsRef<str>>(
        states: &[S],
        alphabet: &[A],
        transition: &[Vec<f64>],
        emission: &[Vec<f64>],
    ) -> Result<Self> {
        let states = LabelSet::new(LabelKind::State, states.iter().map(|s| s.as_ref()))?;
        let alphabet = LabelSet::new(LabelKind::Symbol, alphabet.iter().map(|s| s.as_ref()))?;
        let n = states.len();
        let m = alphabet.len();
        let transition = flatten_rows(MatrixKind::Transition, transition, n, n)?;
        let emission = flatten_rows(MatrixKind::Emission, emission, n, m)?;
        Self::new(states, alphabet, transition, emission)
    }

    /// Number of hidden states.
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// Number of observable symbols.
    pub fn n_symbols(&self) -> usize {
        self.alphabet.len()
    }

    pub fn states(&self) -> &LabelSet {
        &self.states
    }

    pub fn alphabet(&self) -> &LabelSet {
        &self.alphabet
    }

    /// `P(to | from)` by index.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transition[from * self.n_states() + to]
    }

    /// `P(symbol | state)` by index.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn emission(&self, state: usize, symbol: usize) -> f64 {
        self.emission[state * self.n_symbols() + symbol]
    }

    /// Outgoing transition probabilities of `state`, in state order.
    pub fn transition_row(&self, state: usize) -> &[f64] {
        let n = self.n_states();
        &self.transition[state * n..(state + 1) * n]
    }

    /// Emission probabilities of `state`, in alphabet order.
    pub fn emission_row(&self, state: usize) -> &[f64] {
        let m = self.n_symbols();
        &self.emission[state * m..(state + 1) * m]
    }

    #[inline]
    pub(crate) fn log_transition(&self, from: usize, to: usize) -> f64 {
        self.log_transition[from * self.n_states() + to]
    }

    #[inline]
    pub(crate) fn log_emission(&self, state: usize, symbol: usize) -> f64 {
        self.log_emission[state * self.n_symbols() + symbol]
    }

    /// `ln(1 / n_states)`: the uniform initial distribution in log-space.
    pub(crate) fn log_initial(&self) -> f64 {
        -(self.n_states() as f64).ln()
    }

    /// Translate state labels to indices.
    pub fn encode_states<S: AsRef<str>>(&self, path: &[S]) -> Result<Vec<usize>> {
        self.states.encode(path)
    }

    /// Translate symbol labels to indices.
    pub fn encode_symbols<S: AsRef<str>>(&self, sequence: &[S]) -> Result<Vec<usize>> {
        self.alphabet.encode(sequence)
    }

    /// Rows whose sum deviates from 1 by more than `tolerance`.
    ///
    /// The model is never renormalized; callers decide whether to log, warn
    /// or reject. Emission rows are skipped when the alphabet is empty.
    pub fn row_sum_warnings(&self, tolerance: f64) -> Vec<NumericWarning> {
        let mut warnings = Vec::new();
        for (i, state) in self.states.iter().enumerate() {
            if let Some(deviation) = row_sum_deviation(self.transition_row(i), tolerance) {
                warnings.push(NumericWarning::new(
                    MatrixKind::Transition,
                    state,
                    1.0 + deviation,
                    tolerance,
                ));
            }
        }
        if !self.alphabet.is_empty() {
            for (i, state) in self.states.iter().enumerate() {
                if let Some(deviation) = row_sum_deviation(self.emission_row(i), tolerance) {
                    warnings.push(NumericWarning::new(
                        MatrixKind::Emission,
                        state,
                        1.0 + deviation,
                        tolerance,
                    ));
                }
            }
        }
        warnings
    }
}

fn check_entries(kind: MatrixKind, values: &[f64], width: usize, states: &LabelSet) -> Result<()> {
    match values.iter().position(|v| !v.is_finite() || *v < 0.0) {
        Some(pos) => {
            let row = states.get(pos / width).unwrap_or("?");
            Err(TrellisError::parse(format!(
                "{kind} entry {} in row '{row}' (column {}) is not a non-negative finite number",
                values[pos],
                pos % width
            )))
        }
        None => Ok(()),
    }
}

fn flatten_rows(
    kind: MatrixKind,
    rows: &[Vec<f64>],
    n_rows: usize,
    n_cols: usize,
) -> Result<Vec<f64>> {
    if rows.len() != n_rows {
        return Err(TrellisError::parse(format!(
            "{kind} matrix has {} rows, expected {n_rows}",
            rows.len()
        )));
    }
    let mut flat = Vec::with_capacity(n_rows * n_cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(TrellisError::parse(format!(
                "{kind} row {i} has {} values, expected {n_cols}",
                row.len()
            )));
        }
        flat.extend_from_slice(row);
    }
    Ok(flat)
}
