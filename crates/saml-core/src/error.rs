//! Configuration error types.
//!
//! Configuration errors indicate a deployment bug. They are raised to the
//! caller instead of being folded into an authentication failure.

use thiserror::Error;

/// Errors raised while resolving or loading backend configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The user model identifier is not of the `app_label.model_name` shape.
    #[error("user model must be of the form 'app_label.model_name', got '{0}'")]
    InvalidModelIdentifier(String),

    /// The user model identifier is well formed but nothing is registered under it.
    #[error("user model refers to model '{0}' that has not been installed")]
    ModelNotInstalled(String),

    /// The lookup attribute is not a field of the user model.
    #[error("lookup attribute '{field}' is not a field of model '{model}'")]
    UnknownLookupField {
        /// Lookup attribute name.
        field: String,
        /// Model label.
        model: String,
    },

    /// A settings value could not be interpreted.
    #[error("invalid value '{value}' for setting {key}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// The settings document could not be parsed.
    #[error("failed to parse settings: {0}")]
    Parse(String),

    /// The settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigurationError {
    /// Creates an invalid model identifier error.
    #[must_use]
    pub fn invalid_model(identifier: impl Into<String>) -> Self {
        Self::InvalidModelIdentifier(identifier.into())
    }

    /// Creates a model not installed error.
    #[must_use]
    pub fn not_installed(identifier: impl Into<String>) -> Self {
        Self::ModelNotInstalled(identifier.into())
    }

    /// Creates an unknown lookup field error.
    #[must_use]
    pub fn unknown_lookup_field(field: impl Into<String>, model: impl Into<String>) -> Self {
        Self::UnknownLookupField {
            field: field.into(),
            model: model.into(),
        }
    }

    /// Checks if this error concerns the user model identifier.
    #[must_use]
    pub const fn is_model_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidModelIdentifier(_) | Self::ModelNotInstalled(_)
        )
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;
