//! Registry of user models.
//!
//! Maps `app_label.model_name` identifiers to model descriptors so the
//! configured user model can be resolved from settings.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use saml_core::{ConfigResult, ConfigurationError, LOG_TARGET};

use crate::user::ModelDescriptor;

/// Registry of installed user models.
///
/// Lookups are case-insensitive on both parts of the identifier.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<ModelDescriptor>>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in `auth.User` model.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(ModelDescriptor::auth_user());
        registry
    }

    /// Registers a model, replacing any model registered under the same label.
    pub fn register(&self, model: ModelDescriptor) -> Arc<ModelDescriptor> {
        let model = Arc::new(model);
        let key = model.label().key();
        tracing::debug!(target: LOG_TARGET, model = %key, "Registered user model");
        self.models.write().insert(key, Arc::clone(&model));
        model
    }

    /// Resolves an `app_label.model_name` identifier.
    ///
    /// ## Errors
    ///
    /// - [`ConfigurationError::InvalidModelIdentifier`] if the identifier does
    ///   not split into exactly two non-empty parts on `.`.
    /// - [`ConfigurationError::ModelNotInstalled`] if nothing is registered
    ///   under the identifier.
    pub fn get_model(&self, identifier: &str) -> ConfigResult<Arc<ModelDescriptor>> {
        let (app_label, model_name) = split_identifier(identifier)
            .ok_or_else(|| ConfigurationError::invalid_model(identifier))?;

        let key = format!(
            "{}.{}",
            app_label.to_lowercase(),
            model_name.to_lowercase()
        );
        self.models
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| ConfigurationError::not_installed(identifier))
    }

    /// Checks whether an identifier resolves.
    #[must_use]
    pub fn has_model(&self, identifier: &str) -> bool {
        self.get_model(identifier).is_ok()
    }

    /// Lists registered labels, sorted.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.models.read().keys().cloned().collect();
        labels.sort_unstable();
        labels
    }
}

fn split_identifier(identifier: &str) -> Option<(&str, &str)> {
    let mut parts = identifier.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(app_label), Some(model_name), None)
            if !app_label.is_empty() && !model_name.is_empty() =>
        {
            Some((app_label, model_name))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    fn registry() -> ModelRegistry {
        let registry = ModelRegistry::with_defaults();
        registry.register(
            ModelDescriptor::builder("testprofiles", "TestUser")
                .username_field("username")
                .field("username", FieldKind::Text)
                .build(),
        );
        registry
    }

    #[test]
    fn resolves_registered_model() {
        let model = registry().get_model("testprofiles.TestUser").unwrap();
        assert_eq!(model.label().to_string(), "testprofiles.testuser");
    }

    #[test]
    fn resolution_ignores_case() {
        assert!(registry().has_model("AUTH.user"));
    }

    #[test]
    fn unknown_model_is_named() {
        let err = registry().get_model("testprofiles.NonExisting").unwrap_err();
        assert_eq!(
            err.to_string(),
            "user model refers to model 'testprofiles.NonExisting' that has not been installed"
        );
    }

    #[test]
    fn malformed_identifiers_report_shape() {
        let registry = registry();
        for identifier in [
            "random_package.specifier.testprofiles.NonExisting",
            "TestUser",
            "testprofiles.",
            ".TestUser",
            "",
        ] {
            let err = registry.get_model(identifier).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::InvalidModelIdentifier(_)),
                "{identifier}"
            );
            assert!(err
                .to_string()
                .contains("must be of the form 'app_label.model_name'"));
        }
    }

    #[test]
    fn register_replaces_existing_label() {
        let registry = registry();
        registry.register(
            ModelDescriptor::builder("TestProfiles", "testuser")
                .username_field("slug")
                .field("slug", FieldKind::Text)
                .build(),
        );

        let model = registry.get_model("testprofiles.TestUser").unwrap();
        assert_eq!(model.username_field(), Some("slug"));
        assert_eq!(registry.labels(), vec!["auth.user", "testprofiles.testuser"]);
    }
}
