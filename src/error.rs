//! Error types for the decision engine.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EligibilityError>;

/// Every failure the engine can surface to a caller.
///
/// None of these are retried internally: all operations are deterministic,
/// so a failure points at bad input, a bad corpus or a bad artifact.
#[derive(Debug, Error)]
pub enum EligibilityError {
    /// A categorical value at inference time was never seen while fitting.
    #[error("Unknown category in column '{column}': {value}")]
    UnknownCategory { column: String, value: String },

    /// The training corpus is too small or has a single class.
    #[error("Insufficient training data: {0}")]
    InsufficientTrainingData(String),

    /// Artifact missing, corrupt, truncated or written by another format version.
    #[error("Artifact load error: {0}")]
    ArtifactLoad(String),

    /// Artifact could not be written; nothing was published.
    #[error("Artifact save error: {0}")]
    ArtifactSave(String),

    /// Caller-supplied record violates basic range constraints.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed or out-of-range configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Feature matrix width disagrees with a fitted component.
    #[error("Feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
}

impl EligibilityError {
    pub(crate) fn unknown_category(column: &str, value: impl ToString) -> Self {
        EligibilityError::UnknownCategory {
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}
