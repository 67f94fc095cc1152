//! Error types for XR timing analysis.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for timing analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for timing analysis.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    // Input errors (20-29)
    #[error("{path} is not valid text")]
    Decode { path: PathBuf },

    #[error("expected {artifact} missing for run {run}: {path}")]
    MissingInput {
        run: String,
        artifact: String,
        path: PathBuf,
    },

    #[error("trace table {path} lacks required column(s): {missing}")]
    Schema { path: PathBuf, missing: String },

    #[error("no input runs discovered under {root}")]
    NoRuns { root: PathBuf },

    // Aggregation errors (30-39)
    #[error("total duration across all stages of run {run} is zero")]
    EmptyAggregate { run: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot write {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidPattern { .. } => 11,
            Error::Decode { .. } => 20,
            Error::MissingInput { .. } => 21,
            Error::Schema { .. } => 22,
            Error::NoRuns { .. } => 23,
            Error::EmptyAggregate { .. } => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Csv(_) => 62,
            Error::Output { .. } => 63,
        }
    }

    /// Whether the batch can continue after this error.
    ///
    /// Everything scoped to one file or one run is recoverable; the batch only
    /// stops when there is nothing to process or the configuration is unusable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::NoRuns { .. } | Error::Config(_) | Error::InvalidPattern { .. }
        )
    }
}
