//! CLI-specific error types
//!
//! Request-level errors are reported as error responses and the session
//! continues. Only configuration and I/O errors end it.

use std::io;

use thiserror::Error;

use crate::state::StateJsonError;
use crate::store::StoreError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    State(#[from] StateJsonError),
}

impl CliError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        CliError::InvalidRequest(msg.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "DOCSTORE_CLI_CONFIG_ERROR",
            CliError::Io(_) => "DOCSTORE_CLI_IO_ERROR",
            CliError::InvalidRequest(_) => "DOCSTORE_INVALID_REQUEST",
            CliError::Store(e) => e.code(),
            CliError::State(_) => "DOCSTORE_INVALID_STATE",
        }
    }

    /// Whether the session must stop after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, CliError::Config(_) | CliError::Io(_))
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidRequest(format!("Invalid JSON: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_codes_pass_through() {
        let err = CliError::from(StoreError::not_found("doc1"));
        assert_eq!(err.code(), "DOCSTORE_DOCUMENT_NOT_FOUND");
        assert_eq!(err.to_string(), "Document not found: doc1");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(CliError::Config("x".into()).is_fatal());
        assert!(CliError::from(io::Error::new(io::ErrorKind::Other, "closed")).is_fatal());
        assert!(!CliError::invalid_request("x").is_fatal());
    }
}
