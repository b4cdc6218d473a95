//! Error types for the Titanic model search

use thiserror::Error;

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Main error type for the search engine
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Data matrix has no label column")]
    MissingLabel,

    #[error("Feature index {index} out of range for rows of width {width}")]
    IndexOutOfRange { index: usize, width: usize },

    #[error("Dimension mismatch: transform expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Matrix is singular, normal equations have no unique solution")]
    SingularMatrix,

    #[error("Convergence failed after {iterations} iterations")]
    ConvergenceError { iterations: usize },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("No models found")]
    NoModelsFound,
}

impl SearchError {
    /// Errors that only invalidate the current training tuple.
    ///
    /// The orchestrator skips the tuple and keeps going when it sees one of these.
    pub fn is_training_failure(&self) -> bool {
        matches!(
            self,
            SearchError::SingularMatrix
                | SearchError::ConvergenceError { .. }
                | SearchError::TrainingError(_)
                | SearchError::DimensionMismatch { .. }
                | SearchError::ShapeError { .. }
                | SearchError::ModelNotFitted
        )
    }
}

impl From<polars::error::PolarsError> for SearchError {
    fn from(err: polars::error::PolarsError) -> Self {
        SearchError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SearchError {
    fn from(err: ndarray::ShapeError) -> Self {
        SearchError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");

        let err = SearchError::DimensionMismatch { expected: 3, actual: 2 };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: transform expects 3 features, got 2"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SearchError = io_err.into();
        assert!(matches!(err, SearchError::IoError(_)));
        assert!(!err.is_training_failure());
    }

    #[test]
    fn test_training_failures_are_local() {
        assert!(SearchError::SingularMatrix.is_training_failure());
        assert!(SearchError::ConvergenceError { iterations: 10 }.is_training_failure());
        assert!(!SearchError::NoModelsFound.is_training_failure());
        assert!(!SearchError::MissingLabel.is_training_failure());
    }
}
