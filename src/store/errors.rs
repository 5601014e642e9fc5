//! Store error types
//!
//! DocumentNotFound is the only structural error callers routinely see.
//! Lock conflicts and removal mismatches are returned as data.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Document already exists: {0}")]
    DocumentExists(String),

    #[error("Document state has no id")]
    MissingId,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        StoreError::DocumentNotFound(id.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        StoreError::Config(msg.into())
    }

    /// Error for a poisoned registry or document lock
    pub fn poisoned() -> Self {
        StoreError::Internal("Lock poisoned".to_string())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DocumentNotFound(_) => "DOCSTORE_DOCUMENT_NOT_FOUND",
            StoreError::DocumentExists(_) => "DOCSTORE_DOCUMENT_EXISTS",
            StoreError::MissingId => "DOCSTORE_MISSING_ID",
            StoreError::Config(_) => "DOCSTORE_CONFIG_ERROR",
            StoreError::Internal(_) => "DOCSTORE_INTERNAL_ERROR",
        }
    }
}
