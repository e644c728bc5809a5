//! Backend settings.
//!
//! Settings are loaded from a TOML document and can be overridden from the
//! process environment. The loaded value is passed explicitly into every
//! authentication attempt and is never cached by the backend, so a caller may
//! swap settings between attempts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeMapping;
use crate::error::{ConfigResult, ConfigurationError};

/// Default user model identifier.
pub const DEFAULT_AUTH_USER_MODEL: &str = "auth.User";

/// Settings consulted by the SAML2 backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Saml2Settings {
    /// The system default user model, as `app_label.model_name`.
    pub auth_user_model: String,

    /// User model override for SAML logins, as `app_label.model_name`.
    pub saml_user_model: Option<String>,

    /// Field used to look users up. Defaults to the model's username field.
    pub user_main_attribute: Option<String>,

    /// Lookup modifier appended to the lookup field (`""`, `"__exact"` or `"__iexact"`).
    pub user_main_attribute_lookup: String,

    /// Whether users missing from the store are created on first login.
    pub create_unknown_user: bool,

    /// Use the assertion's name id as the lookup value instead of an attribute.
    pub use_name_id_as_username: bool,

    /// IdP attribute to user field mapping.
    pub attribute_mapping: AttributeMapping,
}

impl Default for Saml2Settings {
    fn default() -> Self {
        Self {
            auth_user_model: DEFAULT_AUTH_USER_MODEL.to_string(),
            saml_user_model: None,
            user_main_attribute: None,
            user_main_attribute_lookup: String::new(),
            create_unknown_user: true,
            use_name_id_as_username: false,
            attribute_mapping: AttributeMapping::new().with("uid", ["username"]),
        }
    }
}

impl Saml2Settings {
    /// Parses settings from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    /// Loads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable source.
    ///
    /// Recognised variables: `SAML_AUTH_USER_MODEL`, `SAML_USER_MODEL`,
    /// `SAML_USER_MAIN_ATTRIBUTE`, `SAML_USER_MAIN_ATTRIBUTE_LOOKUP`,
    /// `SAML_CREATE_UNKNOWN_USER` and `SAML_USE_NAME_ID_AS_USERNAME`.
    pub fn with_overrides<F>(mut self, var: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = var("SAML_AUTH_USER_MODEL") {
            self.auth_user_model = model;
        }
        if let Some(model) = var("SAML_USER_MODEL") {
            self.saml_user_model = Some(model);
        }
        if let Some(attribute) = var("SAML_USER_MAIN_ATTRIBUTE") {
            self.user_main_attribute = Some(attribute);
        }
        if let Some(lookup) = var("SAML_USER_MAIN_ATTRIBUTE_LOOKUP") {
            self.user_main_attribute_lookup = lookup;
        }
        if let Some(value) = var("SAML_CREATE_UNKNOWN_USER") {
            self.create_unknown_user = parse_flag("SAML_CREATE_UNKNOWN_USER", &value)?;
        }
        if let Some(value) = var("SAML_USE_NAME_ID_AS_USERNAME") {
            self.use_name_id_as_username = parse_flag("SAML_USE_NAME_ID_AS_USERNAME", &value)?;
        }
        Ok(self)
    }

    /// Returns the user model identifier used for SAML logins.
    #[must_use]
    pub fn user_model_identifier(&self) -> &str {
        self.saml_user_model
            .as_deref()
            .unwrap_or(&self.auth_user_model)
    }
}

fn parse_flag(key: &'static str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
