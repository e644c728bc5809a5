//! Session information handed over by the SAML processing layer.

use saml_core::AttributeMap;
use serde::{Deserialize, Serialize};

/// The already validated outcome of a SAML assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Attribute value assertions.
    #[serde(default)]
    pub ava: AttributeMap,

    /// Entity id of the identity provider that issued the assertion.
    #[serde(default)]
    pub issuer: Option<String>,

    /// Subject name id.
    #[serde(default)]
    pub name_id: Option<String>,
}

impl SessionInfo {
    /// Creates session info from asserted attributes.
    #[must_use]
    pub fn new(ava: AttributeMap) -> Self {
        Self {
            ava,
            issuer: None,
            name_id: None,
        }
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the name id.
    #[must_use]
    pub fn with_name_id(mut self, name_id: impl Into<String>) -> Self {
        self.name_id = Some(name_id.into());
        self
    }
}
