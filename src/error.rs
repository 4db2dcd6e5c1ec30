//! Custom error types for spendlens
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. CSV ingestion has its own [`ParseError`]
//! so callers can tell "no data" apart from a malformed row or an unknown
//! delimiter.

use thiserror::Error;

/// Errors raised while ingesting an expenses CSV
///
/// Any of these aborts the whole parse; ingestion never returns partial
/// results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input had no data rows (empty, whitespace only, or header only)
    #[error("no data found")]
    NoData,

    /// Neither `;` nor `,` split the header into the expected columns
    #[error("unsupported delimiter: expected ';' or ',' separated columns")]
    UnsupportedDelimiter,

    /// A record had the wrong number of fields
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// The date column was not a `YYYY-MM-DD` date
    #[error("line {line}: failed to parse date '{value}'")]
    InvalidDate { line: u64, value: String },

    /// The amount column was not a decimal number
    #[error("line {line}: failed to parse amount '{value}'")]
    InvalidAmount { line: u64, value: String },

    /// The underlying CSV reader failed (bad quoting, invalid UTF-8, ...)
    #[error("failed to read CSV: {0}")]
    Read(String),
}

impl ParseError {
    /// Line number the error refers to, if it is row specific
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::FieldCount { line, .. }
            | Self::InvalidDate { line, .. }
            | Self::InvalidAmount { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// The main error type for spendlens operations
#[derive(Error, Debug)]
pub enum SpendError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// CSV ingestion errors
    #[error("Import error: {0}")]
    Import(#[from] ParseError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SpendError {
    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    pub fn receipt_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Receipt",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for SpendError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SpendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for spendlens operations
pub type SpendResult<T> = Result<T, SpendError>;
