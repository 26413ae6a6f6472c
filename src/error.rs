use std::io;
use thiserror::Error;

/// Error type for analysis operations.
///
/// Only input-level failures are errors. Statistics that cannot be computed
/// for lack of data come back as `None` instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// IO error while reading input.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed delimited text.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON text.
    #[error("JSON parsing error: {message}")]
    Json {
        message: String,
        line: usize,
        column: usize,
    },

    /// Structurally valid input that cannot be analyzed as requested.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Empty file or no data.
    #[error("Empty file or no data to analyze")]
    EmptyData,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return AnalysisError::Io(err.into());
        }
        AnalysisError::Json {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
