//! Error types for minorm

use thiserror::Error;

/// Result type alias for minorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for model and query operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error, passed through from the backend unchanged
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// `get` matched no row
    #[error("Not found: {0}")]
    NotFound(String),

    /// `get` matched more than one row
    #[error("Multiple objects returned: expected 1 row, got {got}")]
    MultipleObjectsReturned { got: usize },

    /// Row or JSON value could not be converted to the declared field type
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON encoding/decoding error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an ambiguous `get` result
    pub fn is_multiple_objects(&self) -> bool {
        matches!(self, Self::MultipleObjectsReturned { .. })
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
