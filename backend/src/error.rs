//! Error types for the data-set series pipeline.
//!
//! One error type per concern:
//!
//! - [`FormatError`] - `%`-escaped date format translation errors
//! - [`ParseError`] - A single index cell that could not be read as a timestamp
//! - [`ReshapeError`] - Payload to series reshaping errors
//! - [`CsvError`] - Delimited text ingestion errors
//! - [`ClientError`] - Data-set REST API errors
//! - [`ConfigError`] - Invalid environment settings
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Lower-level errors convert into [`PipelineError`] via `From`, so `?` works
//! across module boundaries.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Format Errors
// =============================================================================

/// Errors while translating a `%`-escaped date format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The format ends with a bare `%`.
    #[error("Dangling '%' at position {position}")]
    DanglingEscape { position: usize },

    /// `%` is followed by a character with no token mapping.
    #[error("Unknown format token '%{token}' at position {position}")]
    UnknownToken { token: char, position: usize },

    /// A `[` literal section in a token format is never closed.
    #[error("Unclosed literal section starting at position {position}")]
    UnclosedLiteral { position: usize },
}

// =============================================================================
// Index Parse Errors
// =============================================================================

/// An index cell that could not be turned into a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Row {row}: cannot parse '{value}' as a timestamp: {message}")]
pub struct ParseError {
    /// Zero-based position of the row in the payload's `data`.
    pub row: usize,
    /// Raw cell content.
    pub value: String,
    /// What went wrong.
    pub message: String,
}

impl ParseError {
    pub fn new(row: usize, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            value: value.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Reshape Errors
// =============================================================================

/// Errors while reshaping a tabular payload into series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReshapeError {
    /// The payload's date format cannot be translated.
    #[error("Invalid date format: {0}")]
    Format(#[from] FormatError),

    /// The index column is not one of the payload's columns.
    #[error("Index column '{0}' is not a payload column")]
    UnknownIndexColumn(String),

    /// An index cell failed to parse and the policy is to abort.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

// =============================================================================
// CSV Ingestion Errors
// =============================================================================

/// Errors during delimited text ingestion.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// A line the CSV reader rejected.
    #[error("Invalid CSV format at line {line}: {source}")]
    Format {
        line: usize,
        #[source]
        source: csv::Error,
    },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Client Errors
// =============================================================================

/// Errors from the data-set REST API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("API returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The record is not of the expected data type.
    #[error("Data set {id} is of type {actual}, expected {expected}")]
    WrongType {
        id: String,
        expected: String,
        actual: String,
    },

    /// The payload does not match the time-series schema.
    #[error("Invalid payload: {errors:?}")]
    InvalidPayload { errors: Vec<String> },

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading settings from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A boolean variable holds something other than true/false.
    #[error("{var} must be true or false, got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    /// The index error policy is neither `skip` nor `abort`.
    #[error("{var}: unknown index error policy '{value}'")]
    InvalidPolicy { var: &'static str, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Returned by the functions in [`crate::pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV ingestion error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Reshape error.
    #[error("Reshape error: {0}")]
    Reshape(#[from] ReshapeError),

    /// Data-set API error.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// The payload has nothing to plot.
    #[error("Payload has no columns, index column or data to plot")]
    NothingToPlot,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for format translation.
pub type FormatResult<T> = Result<T, FormatError>;

/// Result type for reshaping.
pub type ReshapeResult<T> = Result<T, ReshapeError>;

/// Result type for CSV ingestion.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for API calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for settings.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
