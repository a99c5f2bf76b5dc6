//! Error types for the tabwash library.

use std::path::PathBuf;
use thiserror::Error;

use crate::data::SemanticType;

/// A value that could not be converted to a requested column type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert '{value}' in column '{column}' to {target}")]
pub struct CoercionError {
    /// Column holding the offending value.
    pub column: String,
    /// Requested type.
    pub target: SemanticType,
    /// Rendered form of the offending value.
    pub value: String,
}

/// Main error type for tabwash operations.
#[derive(Debug, Error)]
pub enum WashError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a source file.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File or export format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A container was built without exactly one data source.
    #[error("Construction error: {0}")]
    Construction(String),

    /// The operation requires a dataset without missing cells.
    #[error("Dataset contains {count} missing values, fix missing data first")]
    MissingData { count: usize },

    /// A column could not be converted to the requested type.
    #[error("Coercion failed: {0}")]
    Coercion(#[from] CoercionError),

    /// A column name that is not part of the dataset.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A row label that is not part of the dataset.
    #[error("Unknown row label: {0}")]
    UnknownRow(usize),

    /// Columns of different lengths were combined.
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// The same column name appears twice.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// An argument outside its accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for tabwash operations.
pub type Result<T> = std::result::Result<T, WashError>;
