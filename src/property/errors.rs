//! Property model errors

use thiserror::Error;

use super::shape::Shape;

/// Result type for property operations
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Property model errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("Index {index} out of bounds for '{path}' (tracked length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Cannot convert {from} to {to} at '{path}'")]
    Conversion { from: Shape, to: Shape, path: String },

    #[error("Unknown field '{path}'")]
    UnknownField { path: String },

    #[error("Unsupported type {type_name} at '{path}'")]
    UnsupportedType {
        path: String,
        type_name: &'static str,
    },
}

impl PropertyError {
    /// Create a conversion error
    pub fn conversion(from: Shape, to: Shape, path: impl Into<String>) -> Self {
        PropertyError::Conversion {
            from,
            to,
            path: path.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PropertyError::IndexOutOfBounds { .. } => "DOCSTORE_INDEX_OUT_OF_BOUNDS",
            PropertyError::Conversion { .. } => "DOCSTORE_PROPERTY_CONVERSION",
            PropertyError::UnknownField { .. } => "DOCSTORE_UNKNOWN_FIELD",
            PropertyError::UnsupportedType { .. } => "DOCSTORE_UNSUPPORTED_TYPE",
        }
    }

    /// Path of the property the error refers to
    pub fn path(&self) -> &str {
        match self {
            PropertyError::IndexOutOfBounds { path, .. }
            | PropertyError::Conversion { path, .. }
            | PropertyError::UnknownField { path }
            | PropertyError::UnsupportedType { path, .. } => path,
        }
    }
}
