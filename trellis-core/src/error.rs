//! Structured error types for trellis.

use thiserror::Error;

/// Unified error type for all trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed model description (missing section, count mismatch, bad number)
    #[error("parse error: {0}")]
    Parse(String),

    /// Query outside the model's domain (unknown label, length mismatch, empty input)
    #[error("domain error: {0}")]
    Domain(String),

    /// A cooperative cancellation token fired between timesteps
    #[error("computation cancelled")]
    Cancelled,
}

impl TrellisError {
    /// Shorthand for building a [`TrellisError::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Shorthand for building a [`TrellisError::Domain`].
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }
}

/// Convenience alias used throughout trellis.
pub type Result<T> = std::result::Result<T, TrellisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let e = TrellisError::domain("unknown state 'C' at position 2");
        assert_eq!(e.to_string(), "domain error: unknown state 'C' at position 2");
        let e = TrellisError::parse("line 3: expected 2 values");
        assert_eq!(e.to_string(), "parse error: line 3: expected 2 values");
        assert_eq!(TrellisError::Cancelled.to_string(), "computation cancelled");
    }

    #[test]
    fn io_converts_with_question_mark() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(TrellisError::Io(_))));
    }
}
