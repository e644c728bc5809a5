//! Storage error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Record not found.
    #[error("User record not found: {0}")]
    NotFound(Uuid),

    /// Unique constraint violation.
    #[error("Duplicate user record: {field} '{value}' already exists")]
    Duplicate {
        /// Field that caused the conflict.
        field: String,
        /// Conflicting value.
        value: String,
    },

    /// Invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StorageError {
    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Checks if this is a duplicate error.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
