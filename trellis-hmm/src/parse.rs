//! Parser for the sectioned HMM problem format.
//!
//! A document is a list of sections separated by lines made only of `-`
//! characters (at least two). Which sections appear depends on the query:
//!
//! | [`QueryKind`]                    | sections                                          |
//! |----------------------------------|---------------------------------------------------|
//! | `PathProbability`                | path, states, transition                          |
//! | `EmissionProbability`            | sequence, alphabet, path, states, emission        |
//! | `Likelihood`, `Decode`           | sequence, alphabet, states, transition, emission  |
//!
//! Label lines are whitespace separated. A matrix block is a header line of
//! column labels followed by one row per state: the row label, then one
//! number per header column.
//!
//! ```text
//! xyxzzxyxyy
//! --------
//! x   y   z
//! --------
//! A   B
//! --------
//!     A   B
//! A   0.641   0.359
//! B   0.729   0.271
//! --------
//!     x   y   z
//! A   0.117   0.691   0.192
//! B   0.097   0.42    0.483
//! ```

use std::fs;
use std::path::Path;

use log::{debug, warn};
use trellis_core::{Result, TrellisError};

use crate::config::InferenceConfig;
use crate::diagnostics::{MatrixKind, NumericWarning};
use crate::model::{LabelKind, LabelSet, Model};

/// Which operation a document is laid out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Probability of a hidden path.
    PathProbability,
    /// Probability of a sequence given a hidden path.
    EmissionProbability,
    /// Forward likelihood of a sequence.
    Likelihood,
    /// Viterbi decoding of a sequence.
    Decode,
}

impl QueryKind {
    fn n_sections(self) -> usize {
        match self {
            QueryKind::PathProbability => 3,
            QueryKind::EmissionProbability
            | QueryKind::Likelihood
            | QueryKind::Decode => 5,
        }
    }
}

/// A model plus the query data found in a document.
#[derive(Debug, Clone)]
pub struct ParsedInput {
    pub model: Model,
    /// Observed symbols. Empty for path-probability documents.
    pub sequence: Vec<String>,
    /// Hidden states. Empty unless the document carries a path.
    pub path: Vec<String>,
    /// Row-sum deviations found in the model (already logged).
    pub warnings: Vec<NumericWarning>,
}

/// One non-blank line with its 1-based line number.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

type Section<'a> = Vec<Line<'a>>;

/// Parse a document laid out for `kind`.
///
/// Row sums are checked against `config.tolerance`; each deviation is logged at
/// warn level and returned in [`ParsedInput::warnings`].
///
/// # Errors
///
/// Returns [`TrellisError::Parse`] on a missing or extra section, a matrix
/// whose header or rows do not match the declared labels, or a value that is
/// not a number.
pub fn parse_input(input: &str, kind: QueryKind, config: &InferenceConfig) -> Result<ParsedInput> {
    let sections = split_sections(input);
    let expected = kind.n_sections();
    if sections.len() != expected {
        return Err(TrellisError::parse(format!(
            "{kind:?} input needs {expected} sections separated by '--------' lines, found {}",
            sections.len()
        )));
    }

    let parsed = match kind {
        QueryKind::PathProbability => {
            let path_line = single_line(&sections[0], "hidden path")?;
            let states = label_line(&sections[1], LabelKind::State)?;
            let transition = parse_matrix(&sections[2], MatrixKind::Transition, &states, &states)?;
            let path = tokenize(path_line.text, &states);
            let alphabet = LabelSet::new(LabelKind::Symbol, Vec::<String>::new())?;
            let model = Model::new(states, alphabet, transition, Vec::new())?;
            (model, Vec::new(), path)
        }
        QueryKind::EmissionProbability => {
            let sequence_line = single_line(&sections[0], "sequence")?;
            let alphabet = label_line(&sections[1], LabelKind::Symbol)?;
            let path_line = single_line(&sections[2], "hidden path")?;
            let states = label_line(&sections[3], LabelKind::State)?;
            let emission = parse_matrix(&sections[4], MatrixKind::Emission, &states, &alphabet)?;
            let sequence = tokenize(sequence_line.text, &alphabet);
            let path = tokenize(path_line.text, &states);
            debug!("no transition block; using a uniform transition matrix");
            let n = states.len();
            let transition = vec![1.0 / n as f64; n * n];
            let model = Model::new(states, alphabet, transition, emission)?;
            (model, sequence, path)
        }
        QueryKind::Likelihood | QueryKind::Decode => {
            let sequence_line = single_line(&sections[0], "sequence")?;
            let alphabet = label_line(&sections[1], LabelKind::Symbol)?;
            let states = label_line(&sections[2], LabelKind::State)?;
            let transition = parse_matrix(&sections[3], MatrixKind::Transition, &states, &states)?;
            let emission = parse_matrix(&sections[4], MatrixKind::Emission, &states, &alphabet)?;
            let sequence = tokenize(sequence_line.text, &alphabet);
            let model = Model::new(states, alphabet, transition, emission)?;
            (model, sequence, Vec::new())
        }
    };
    let (model, sequence, path) = parsed;

    debug!(
        "parsed {kind:?} input: {} states, {} symbols, sequence length {}, path length {}",
        model.n_states(),
        model.n_symbols(),
        sequence.len(),
        path.len()
    );

    let warnings = model.row_sum_warnings(config.tolerance);
    for w in &warnings {
        warn!("{w}");
    }

    Ok(ParsedInput {
        model,
        sequence,
        path,
        warnings,
    })
}

/// Read and parse a document from disk.
pub fn parse_input_file(
    path: impl AsRef<Path>,
    kind: QueryKind,
    config: &InferenceConfig,
) -> Result<ParsedInput> {
    let path = path.as_ref();
    debug!("reading {}", path.display());
    let text = fs::read_to_string(path)?;
    parse_input(&text, kind, config)
}

/// Split a sequence or path token into labels.
///
/// When every label is a single character, the token is split per character
/// (whitespace ignored); otherwise it is split on whitespace. Unknown labels
/// are kept as-is and rejected later by the inference operation.
pub fn tokenize(text: &str, labels: &LabelSet) -> Vec<String> {
    if labels.all_single_char() {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect()
    } else {
        text.split_whitespace().map(String::from).collect()
    }
}

fn is_delimiter(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 2 && line.chars().all(|c| c == '-')
}

fn split_sections(input: &str) -> Vec<Section<'_>> {
    let mut sections = vec![Vec::new()];
    for (i, text) in input.lines().enumerate() {
        if is_delimiter(text) {
            sections.push(Vec::new());
        } else if !text.trim().is_empty() {
            if let Some(current) = sections.last_mut() {
                current.push(Line {
                    number: i + 1,
                    text: text.trim(),
                });
            }
        }
    }
    // trailing delimiter or trailing blank section
    if sections.len() > 1 && sections.last().is_some_and(|s| s.is_empty()) {
        sections.pop();
    }
    sections
}

fn single_line<'a>(section: &Section<'a>, what: &str) -> Result<Line<'a>> {
    match section.as_slice() {
        [line] => Ok(*line),
        [] => Err(TrellisError::parse(format!("missing {what} line"))),
        [_, extra, ..] => Err(TrellisError::parse(format!(
            "line {}: expected a single {what} line",
            extra.number
        ))),
    }
}

fn label_line(section: &Section<'_>, kind: LabelKind) -> Result<LabelSet> {
    let line = single_line(section, &format!("{kind} label"))?;
    LabelSet::new(kind, line.text.split_whitespace()).map_err(|e| match e {
        TrellisError::Parse(msg) => TrellisError::parse(format!("line {}: {msg}", line.number)),
        other => other,
    })
}

/// Parse a labelled matrix block into a row-major table in declared order.
fn parse_matrix(
    section: &Section<'_>,
    kind: MatrixKind,
    rows: &LabelSet,
    cols: &LabelSet,
) -> Result<Vec<f64>> {
    let Some((header, body)) = section.split_first() else {
        return Err(TrellisError::parse(format!("missing {kind} matrix")));
    };

    let header_labels: Vec<&str> = header.text.split_whitespace().collect();
    if header_labels.len() != cols.len() {
        return Err(TrellisError::parse(format!(
            "line {}: {kind} header has {} columns, expected {}",
            header.number,
            header_labels.len(),
            cols.len()
        )));
    }
    let mut column_index = Vec::with_capacity(header_labels.len());
    for label in &header_labels {
        let j = cols.index_of(label).ok_or_else(|| {
            TrellisError::parse(format!(
                "line {}: {kind} header names undeclared {} '{label}'",
                header.number,
                cols.kind()
            ))
        })?;
        if column_index.contains(&j) {
            return Err(TrellisError::parse(format!(
                "line {}: {kind} header repeats '{label}'",
                header.number
            )));
        }
        column_index.push(j);
    }

    if body.len() != rows.len() {
        return Err(TrellisError::parse(format!(
            "{kind} matrix has {} rows, expected {}",
            body.len(),
            rows.len()
        )));
    }

    let width = cols.len();
    let mut matrix = vec![0.0; rows.len() * width];
    let mut seen = vec![false; rows.len()];
    for line in body {
        let mut fields = line.text.split_whitespace();
        let label = fields.next().unwrap_or_default();
        let i = rows.index_of(label).ok_or_else(|| {
            TrellisError::parse(format!(
                "line {}: {kind} row for undeclared state '{label}'",
                line.number
            ))
        })?;
        if std::mem::replace(&mut seen[i], true) {
            return Err(TrellisError::parse(format!(
                "line {}: duplicate {kind} row for state '{label}'",
                line.number
            )));
        }

        let values = fields
            .map(|f| {
                f.parse::<f64>().map_err(|_| {
                    TrellisError::parse(format!("line {}: '{f}' is not a number", line.number))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        if values.len() != width {
            return Err(TrellisError::parse(format!(
                "line {}: {kind} row '{label}' has {} values, expected {width}",
                line.number,
                values.len()
            )));
        }
        for (&j, v) in column_index.iter().zip(values) {
            matrix[i * width + j] = v;
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str, kind: QueryKind) -> Result<ParsedInput> {
        parse_input(doc, kind, &InferenceConfig::default())
    }

    const DECODE: &str = "xyxzzxyxyy
--------
x   y   z
--------
A   B
--------
\tA\tB
A\t0.641\t0.359
B\t0.729\t0.271
--------
\tx\ty\tz
A\t0.117\t0.691\t0.192
B\t0.097\t0.42\t0.483
";

    const PATH: &str = "ABABBBAAAA
--------
A B
--------
    A   B
A   0.377   0.623
B   0.26    0.74
";

    const EMISSION: &str = "zzzyxyyzzx
--------
x   y   z
--------
BAAAAAAAAB
--------
A   B
--------
    x   y   z
A   0.176   0.596   0.228
B   0.225   0.572   0.203
";

    #[test]
    fn parses_decode_document() {
        let parsed = parse(DECODE, QueryKind::Decode).unwrap();
        let model = &parsed.model;
        assert_eq!(model.n_states(), 2);
        assert_eq!(model.n_symbols(), 3);
        assert_eq!(model.transition(1, 0), 0.729);
        assert_eq!(model.emission(0, 1), 0.691);
        assert_eq!(parsed.sequence.len(), 10);
        assert_eq!(parsed.sequence[3], "z");
        assert!(parsed.path.is_empty());
        assert!(parsed.warnings.is_empty());
        assert_eq!(model.viterbi(&parsed.sequence).unwrap().render(model), "AAABBAAAAA");
    }

    #[test]
    fn parses_path_document() {
        let parsed = parse(PATH, QueryKind::PathProbability).unwrap();
        assert_eq!(parsed.model.n_symbols(), 0);
        assert_eq!(parsed.path.concat(), "ABABBBAAAA");
        let p = parsed.model.path_probability(&parsed.path).unwrap();
        assert!((p - 0.000384928691755).abs() < 1e-15);
    }

    #[test]
    fn parses_emission_document() {
        let parsed = parse(EMISSION, QueryKind::EmissionProbability).unwrap();
        assert_eq!(parsed.sequence.len(), 10);
        assert_eq!(parsed.path.len(), 10);
        assert_eq!(parsed.model.transition(0, 1), 0.5);
        let p = parsed
            .model
            .conditional_emission_probability(&parsed.sequence, &parsed.path)
            .unwrap();
        assert!((p - 4.599063341926444e-06).abs() < 1e-16);
    }

    #[test]
    fn header_columns_are_reordered() {
        let doc = "AB\n--\nA B\n--\n B A\nA 0.1 0.9\nB 0.8 0.2\n";
        let parsed = parse(doc, QueryKind::PathProbability).unwrap();
        assert_eq!(parsed.model.transition(0, 0), 0.9);
        assert_eq!(parsed.model.transition(0, 1), 0.1);
        assert_eq!(parsed.model.transition(1, 1), 0.8);
    }

    #[test]
    fn multi_character_labels_split_on_whitespace() {
        let doc = "hi lo hi\n--\nhi lo\n--\nS1 S2\n--\n S1 S2\nS1 0.9 0.1\nS2 0.1 0.9\n\
                   --\n hi lo\nS1 0.7 0.3\nS2 0.2 0.8\n";
        let parsed = parse(doc, QueryKind::Likelihood).unwrap();
        assert_eq!(parsed.sequence, vec!["hi", "lo", "hi"]);
    }

    #[test]
    fn structural_errors() {
        let missing = "AB\n--\nA B\n";
        assert!(matches!(
            parse(missing, QueryKind::PathProbability),
            Err(TrellisError::Parse(_))
        ));

        let short_row = "AB\n--\nA B\n--\n A B\nA 0.5\nB 0.5 0.5\n";
        let err = parse(short_row, QueryKind::PathProbability).unwrap_err();
        assert!(err.to_string().contains("line 6"), "{err}");

        let bad_number = "AB\n--\nA B\n--\n A B\nA 0.5 abc\nB 0.5 0.5\n";
        let err = parse(bad_number, QueryKind::PathProbability).unwrap_err();
        assert!(err.to_string().contains("'abc' is not a number"));

        let unknown_row = "AB\n--\nA B\n--\n A B\nA 0.5 0.5\nC 0.5 0.5\n";
        assert!(parse(unknown_row, QueryKind::PathProbability).is_err());

        let repeated_row = "AB\n--\nA B\n--\n A B\nA 0.5 0.5\nA 0.5 0.5\n";
        assert!(parse(repeated_row, QueryKind::PathProbability).is_err());

        let duplicate_states = "AB\n--\nA A\n--\n A A\nA 0.5 0.5\nA 0.5 0.5\n";
        let err = parse(duplicate_states, QueryKind::PathProbability).unwrap_err();
        assert!(err.to_string().contains("duplicate state label 'A'"));
    }

    #[test]
    fn non_stochastic_rows_are_warnings_not_errors() {
        let doc = "AB\n--\nA B\n--\n A B\nA 0.5 0.6\nB 0.5 0.5\n";
        let parsed = parse(doc, QueryKind::PathProbability).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].state, "A");
        assert_eq!(parsed.model.transition(0, 1), 0.6);

        let loose = InferenceConfig {
            tolerance: 0.2,
            ..InferenceConfig::default()
        };
        assert!(parse_input(doc, QueryKind::PathProbability, &loose)
            .unwrap()
            .warnings
            .is_empty());
    }

    #[test]
    fn unknown_query_symbols_survive_parsing() {
        let doc = DECODE.replacen("xyxzzxyxyy", "xyq", 1);
        let parsed = parse(&doc, QueryKind::Likelihood).unwrap();
        assert!(matches!(
            parsed.model.forward(&parsed.sequence),
            Err(TrellisError::Domain(_))
        ));
    }

    #[test]
    fn trailing_delimiter_is_ignored() {
        let doc = format!("{PATH}--------\n");
        assert!(parse(&doc, QueryKind::PathProbability).is_ok());
    }
}
