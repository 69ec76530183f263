//! Discrete hidden Markov model inference.
//!
//! A [`Model`] holds ordered state and symbol labels, a transition matrix and
//! an emission matrix, with a uniform initial distribution over states. Four
//! stateless queries run against a shared `&Model`:
//!
//! - **Path probability**: [`Model::path_probability`]
//! - **Conditional emission probability**: [`Model::conditional_emission_probability`]
//! - **Forward likelihood**: [`Model::forward`], summing over all hidden paths
//! - **Viterbi decoding**: [`Model::viterbi`], the most probable hidden path
//!
//! The forward and Viterbi trellises are evaluated in log-space, so long
//! sequences do not underflow. With the `parallel` feature each trellis
//! column is split across rayon workers once the model has enough states.
//!
//! # Quick start
//!
//! ```
//! use trellis_hmm::Model;
//!
//! let model = Model::from_rows(
//!     &["A", "B"],
//!     &["x", "y", "z"],
//!     &[vec![0.86, 0.14], vec![0.41, 0.59]],
//!     &[vec![0.669, 0.312, 0.02], vec![0.467, 0.295, 0.238]],
//! )
//! .unwrap();
//!
//! let seq = ["x", "y", "x", "z"];
//! let likelihood = model.forward(&seq).unwrap().probability();
//! assert!((likelihood - 0.007623819546542348).abs() < 1e-12);
//!
//! let decoded = model.viterbi(&seq).unwrap();
//! assert_eq!(decoded.render(&model), "AAAB");
//! ```

pub mod config;
pub mod diagnostics;
mod emission;
pub mod forward;
pub mod model;
pub mod parse;
mod path;
mod trellis;
pub mod viterbi;

pub use config::{InferenceConfig, InferenceOptions};
pub use diagnostics::{MatrixKind, NumericWarning};
pub use forward::ForwardResult;
pub use model::{LabelKind, LabelSet, Model};
pub use parse::{parse_input, parse_input_file, ParsedInput, QueryKind};
pub use viterbi::ViterbiPath;

pub use trellis_core::{CancelToken, Result, TrellisError};
