//! Backend error types.
//!
//! Only configuration and storage failures are errors. Every per-attempt
//! resolution failure (unauthorized, unknown user, ambiguous lookup) is an
//! `Ok(None)` outcome plus a log line.

use saml_core::ConfigurationError;
use saml_storage::StorageError;
use thiserror::Error;

/// Errors raised by the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Deployment or settings bug.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The user store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl BackendError {
    /// Checks if this is a configuration error.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
