//! Error types for Rollcall core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Rollcall core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] rollcall_storage::StorageError),

    /// The stored document is not valid JSON, or a value could not be
    /// serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored document is valid JSON but does not have the expected shape.
    #[error("invalid database format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The caller supplied an unusable collection name or payload.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of what was rejected.
        message: String,
    },

    /// No record with the requested id exists in the collection.
    #[error("record {id} not found in collection {collection}")]
    NotFound {
        /// The collection searched.
        collection: String,
        /// The id that was not found.
        id: String,
    },

    /// A uniqueness rule enforced above the store was violated.
    #[error("duplicate: {message}")]
    Duplicate {
        /// Description of the clash.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }

    /// Returns true if the caller can fix this by changing the request.
    ///
    /// Client errors never leave the store modified.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation { .. } | CoreError::NotFound { .. } | CoreError::Duplicate { .. }
        )
    }

    /// Returns true if reading or writing the database itself failed.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            CoreError::Storage(_) | CoreError::Serialization(_) | CoreError::InvalidFormat { .. }
        )
    }
}
