//! Query error types
//!
//! Every error aborts the whole execution; there are no partial results.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Operator is reserved or unknown
    #[error("Operator not implemented: {operator}")]
    NotImplemented { operator: String },

    /// Ordering comparison between values of incompatible kinds
    #[error("Type mismatch on field '{field}': cannot compare {found} with {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Failure surfaced by the transaction or its indexes
    #[error("Store failure: {0}")]
    Store(StoreError),

    /// A per-document fetch found nothing for an identifier that was
    /// expected to exist
    #[error("Missing document: {key_path}")]
    MissingDocument { key_path: String },

    /// A document read from the store has no usable identifier
    #[error("Document without identifier field '{id_prop}'")]
    MissingIdentifier { id_prop: String },

    /// Key path cannot address a collection
    #[error("Invalid key path: {0}")]
    InvalidKeyPath(String),
}

impl QueryError {
    pub fn not_implemented(operator: impl Into<String>) -> Self {
        Self::NotImplemented {
            operator: operator.into(),
        }
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

    pub fn missing_document(key_path: impl ToString) -> Self {
        Self::MissingDocument {
            key_path: key_path.to_string(),
        }
    }

    pub fn missing_identifier(id_prop: impl Into<String>) -> Self {
        Self::MissingIdentifier {
            id_prop: id_prop.into(),
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotImplemented { .. } => "NOT_IMPLEMENTED",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::Store(_) => "STORE_FAILURE",
            Self::MissingDocument { .. } => "MISSING_DOCUMENT",
            Self::MissingIdentifier { .. } => "MISSING_IDENTIFIER",
            Self::InvalidKeyPath(_) => "INVALID_KEY_PATH",
        }
    }

    /// Returns true for failures raised by the store rather than the query
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// An index type mismatch is the same error the in-memory comparison
/// raises, so both access paths fail alike.
impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TypeMismatch {
                field,
                expected,
                found,
            } => Self::TypeMismatch {
                field,
                expected,
                found,
            },
            other => Self::Store(other),
        }
    }
}
