//! Error types for the inference pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for a pipeline call.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Category of a payload parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    EmptyInput,
    MalformedJson,
    MalformedScalarList,
    NonFinite,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::EmptyInput => "empty_input",
            ParseErrorKind::MalformedJson => "malformed_json",
            ParseErrorKind::MalformedScalarList => "malformed_scalar_list",
            ParseErrorKind::NonFinite => "non_finite",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payload could not be turned into numbers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty features payload")]
    EmptyInput,

    #[error("Malformed JSON array: {0}")]
    MalformedJson(String),

    #[error("Malformed value {token:?} at position {position}")]
    MalformedScalarList { token: String, position: usize },

    #[error("Non-finite value at position {position}")]
    NonFinite { position: usize },
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::EmptyInput => ParseErrorKind::EmptyInput,
            ParseError::MalformedJson(_) => ParseErrorKind::MalformedJson,
            ParseError::MalformedScalarList { .. } => ParseErrorKind::MalformedScalarList,
            ParseError::NonFinite { .. } => ParseErrorKind::NonFinite,
        }
    }
}

/// Feature count does not match the classifier input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {expected} features, got {got}{}", row_suffix(.row))]
pub struct ShapeError {
    pub expected: usize,
    pub got: usize,
    /// Offending row for multi-row batches.
    pub row: Option<usize>,
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" (row {r})")).unwrap_or_default()
}

/// Failure inside the classification backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("{0}")]
    Backend(String),

    #[error("Unexpected model output: {0}")]
    InvalidOutput(String),

    #[error("Model session lock poisoned")]
    Poisoned,
}

impl ClassifierError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }
}

/// Startup failure loading model or label artifacts. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid label file {path}: {message}")]
    InvalidLabels { path: PathBuf, message: String },

    #[error("Label set is empty")]
    EmptyLabelSet,

    #[error("Duplicate label {0:?}")]
    DuplicateLabel(String),

    #[error("Model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Invalid feature dimension: {0}")]
    InvalidDimension(usize),
}

impl ConfigError {
    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad(message.into())
    }
}

/// Ownership of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller input was unusable.
    BadRequest,
    /// Classifier invocation failed.
    ServerFault,
    /// Classifier and label set disagree on the number of classes.
    LabelSetMismatch,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::ServerFault => "server_fault",
            ErrorKind::LabelSetMismatch => "label_set_mismatch",
        }
    }

    /// Whether the caller owns the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorKind::BadRequest)
    }
}

/// Failure of a single pipeline call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("Prediction error: {0}")]
    ModelFailure(#[from] ClassifierError),

    #[error("Predicted class index {index} has no label ({labels} labels loaded)")]
    LabelSetMismatch { index: usize, labels: usize },
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::Parse(_) | InferenceError::Shape(_) => ErrorKind::BadRequest,
            InferenceError::ModelFailure(_) => ErrorKind::ServerFault,
            InferenceError::LabelSetMismatch { .. } => ErrorKind::LabelSetMismatch,
        }
    }

    /// Parse failure category, if this is a parse error.
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            InferenceError::Parse(e) => Some(e.kind()),
            _ => None,
        }
    }
}
