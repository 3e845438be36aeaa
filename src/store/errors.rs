//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by a document store transaction or its indexes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The transaction was aborted; every later call fails
    #[error("Transaction aborted")]
    Aborted,

    /// The backing store cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Key path cannot address a collection or document
    #[error("Invalid key path: {0}")]
    InvalidKeyPath(String),

    /// Document cannot be stored
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Read against an index that was never created
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Range read whose bound cannot be ordered against an indexed value
    #[error("Type mismatch on field '{field}': cannot compare {found} with {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn invalid_key_path(reason: impl Into<String>) -> Self {
        Self::InvalidKeyPath(reason.into())
    }

    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Self::InvalidDocument(reason.into())
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            found,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Aborted => "TX_ABORTED",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
            Self::InvalidKeyPath(_) => "INVALID_KEY_PATH",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
            Self::IndexNotFound(_) => "INDEX_NOT_FOUND",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::unavailable("connection reset");
        assert_eq!(err.to_string(), "Store unavailable: connection reset");
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_aborted_code() {
        assert_eq!(StoreError::Aborted.code(), "TX_ABORTED");
    }
}
