use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// pipeline ingests, transforms, or emits data.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors bubbled up from the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a configuration file cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when an input file does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a stage needs a column the table does not carry.
    #[error("column '{column}' not found while {stage}")]
    MissingColumn { column: String, stage: &'static str },

    /// Errors raised while computing column statistics.
    #[error("statistics error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Raised when a source tag is not one of the known sources.
    #[error("unknown source '{0}' (expected facebook, google or website)")]
    UnknownSource(String),

    /// Raised when the pipeline configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
