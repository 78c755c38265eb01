//! Domain error types
//!
//! This module defines the error hierarchy for Formulary. Third-party error
//! types (csv, tokio-postgres, deadpool) are converted to strings at the
//! adapter boundary so they never leak through the public API.
//!
//! Individual malformed cells are *not* errors: the field normalizers return
//! `None` for them. Everything represented here is fatal to a pipeline run.

use thiserror::Error;

/// Main Formulary error type
#[derive(Debug, Error)]
pub enum FormularyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An extract is missing, unreadable, or not in its configured encoding
    #[error("Source read error: {0}")]
    SourceRead(String),

    /// A batch insert could not be committed
    #[error(
        "Batch commit failed for table '{table}' (batch {batch}, {rows_committed} rows committed before it): {message}"
    )]
    BatchCommit {
        /// Target table name
        table: String,
        /// 1-based number of the batch that failed
        batch: usize,
        /// Rows already committed by earlier batches of the same load
        rows_committed: usize,
        /// Underlying store error
        message: String,
    },

    /// An aggregate population pass failed
    #[error("Aggregate error: {0}")]
    Aggregate(String),

    /// A duplicate-removal pass failed
    #[error("Deduplication error: {0}")]
    Dedupe(String),

    /// Database-related errors (generic)
    #[error("Database error: {0}")]
    Database(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl FormularyError {
    /// Whether this error is a connectivity problem rather than a data problem
    pub fn is_connection(&self) -> bool {
        matches!(self, FormularyError::Connection(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FormularyError {
    fn from(err: std::io::Error) -> Self {
        FormularyError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FormularyError {
    fn from(err: serde_json::Error) -> Self {
        FormularyError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FormularyError {
    fn from(err: toml::de::Error) -> Self {
        FormularyError::Configuration(format!("TOML parse error: {err}"))
    }
}
