//! Error types shared by the reader, the distance engine, the threshold
//! estimator and the agreement evaluator.
//!
//! ```text
//! EvalError (top-level)
//! ├── ParseError     (object store records; fatal or skippable)
//! └── DistanceError  (degenerate input to a distance function)
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Convenient `Result` alias used by orchestration-level functions.
pub type EvalResult<T> = Result<T, EvalError>;

/// Top-level error of the evaluation pipeline.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Distance error: {0}")]
    Distance(#[from] DistanceError),

    /// Joint-count or dimensionality disagreement between compared objects,
    /// or between the object counts of two corresponding representations.
    #[error("Shape mismatch ({context}): expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Corresponding representations list different objects at some index.
    #[error("Object ids disagree at {count} position(s), first at {position}: {left} vs {right}")]
    KeyMismatch {
        count: usize,
        position: usize,
        left: String,
        right: String,
    },

    #[error("Insufficient data: need at least {needed} objects, {available} available")]
    InsufficientData { needed: usize, available: usize },

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EvalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn shape(context: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

/// A malformed or inconsistent object-store record.
#[derive(Debug, Error)]
#[error("Parse error at line {line}{}: {kind}", object_suffix(.id))]
pub struct ParseError {
    /// 1-based line number where the problem was detected.
    pub line: usize,
    /// Object id of the record being parsed, when known.
    pub id: Option<String>,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, id: Option<String>, kind: ParseErrorKind) -> Self {
        Self { line, id, kind }
    }

    /// File-level structural errors abort the run; the rest only drop the
    /// offending record.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

fn object_suffix(id: &Option<String>) -> String {
    id.as_deref()
        .map(|id| format!(" (object {id})"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("payload line contains no parsable numeric tokens")]
    NoNumericTokens,
    #[error("invalid numeric token {0:?}")]
    InvalidNumber(String),
    #[error("declared frame count {declared} but read {read} payload lines")]
    FrameCountMismatch { declared: usize, read: usize },
    #[error("frames of one object have different joint counts")]
    InconsistentJoints,
    #[error("expected {expected} values per item (from earlier records), found {found}")]
    InconsistentShape { expected: usize, found: usize },
    #[error("{0} coordinates cannot be grouped into 3D joints")]
    JointCountNotTriple(usize),
    #[error("record has no payload lines")]
    EmptyPayload,
    #[error("#objectKey marker without an identifier")]
    MissingId,
    #[error("unreadable input: {0}")]
    Unreadable(String),
}

impl ParseErrorKind {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::FrameCountMismatch { .. }
                | ParseErrorKind::InconsistentShape { .. }
                | ParseErrorKind::Unreadable(_)
        )
    }
}

/// Degenerate input to a distance function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceError {
    #[error("sequence has no frames")]
    EmptySequence,
    #[error("sequence of {len} frames exceeds the configured maximum of {max}")]
    SequenceTooLong { len: usize, max: usize },
    #[error("cannot compare a skeleton sequence with an embedding vector")]
    MixedPayloads,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_kinds_are_structural() {
        assert!(ParseErrorKind::FrameCountMismatch {
            declared: 8,
            read: 7
        }
        .is_fatal());
        assert!(ParseErrorKind::InconsistentShape {
            expected: 93,
            found: 90
        }
        .is_fatal());
        assert!(!ParseErrorKind::NoNumericTokens.is_fatal());
        assert!(!ParseErrorKind::InconsistentJoints.is_fatal());
    }

    #[test]
    fn parse_error_message_names_the_record() {
        let err = ParseError::new(12, Some("3136_113_1072_97".into()), ParseErrorKind::EmptyPayload);
        let msg = err.to_string();
        assert!(msg.contains("line 12"), "{msg}");
        assert!(msg.contains("3136_113_1072_97"), "{msg}");
    }
}
