//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading and indexing the input datasets.
///
/// Dataset problems are fatal at startup; nothing in the serving path
/// touches the loaders again, so none of these are recoverable
/// mid-request.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// I/O error occurred while reading a dataset file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader rejected the file outright
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., rating for a movie that is
    /// not in the catalog)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
