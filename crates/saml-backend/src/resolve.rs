//! Resolution of the user model and its lookup key from settings.
//!
//! Nothing here is cached: settings may change between calls and every call
//! re-reads them.

use std::sync::Arc;

use saml_core::{AttributeMapping, ConfigResult, ConfigurationError, Saml2Settings, LOG_TARGET};
use saml_model::{ModelDescriptor, ModelRegistry, DEFAULT_USERNAME_FIELD};
use saml_storage::LookupModifier;

/// Returns the user model used for SAML logins.
///
/// The `saml_user_model` override wins over the system default
/// `auth_user_model`.
///
/// ## Errors
///
/// Returns a [`ConfigurationError`] if the identifier is malformed or not
/// registered.
pub fn saml_user_model(
    settings: &Saml2Settings,
    registry: &ModelRegistry,
) -> ConfigResult<Arc<ModelDescriptor>> {
    registry.get_model(settings.user_model_identifier())
}

/// Returns the field users are looked up by.
///
/// Settings override first, then the field the model declares as its
/// natural identifier, then `"username"`.
#[must_use]
pub fn user_lookup_attribute(settings: &Saml2Settings, model: &ModelDescriptor) -> String {
    settings
        .user_main_attribute
        .as_deref()
        .or_else(|| model.username_field())
        .unwrap_or(DEFAULT_USERNAME_FIELD)
        .to_string()
}

/// Returns the lookup comparison configured in settings.
///
/// ## Errors
///
/// Returns [`ConfigurationError::InvalidValue`] for an unsupported suffix.
pub fn lookup_modifier(settings: &Saml2Settings) -> ConfigResult<LookupModifier> {
    let suffix = settings.user_main_attribute_lookup.as_str();
    LookupModifier::from_suffix(suffix).ok_or_else(|| ConfigurationError::InvalidValue {
        key: "user_main_attribute_lookup",
        value: suffix.to_string(),
    })
}

/// Validates settings against the registered models.
///
/// Meant to run at startup. Fails if the user model does not resolve, the
/// lookup modifier is unsupported, or the lookup key is not a declared field
/// of the model. Mapping targets that resolve to neither a field nor a hook
/// are returned (and logged) rather than rejected; at login time they are
/// skipped.
///
/// ## Errors
///
/// Returns the first configuration error found.
pub fn validate_configuration(
    settings: &Saml2Settings,
    registry: &ModelRegistry,
    attribute_mapping: &AttributeMapping,
) -> ConfigResult<Vec<String>> {
    let model = saml_user_model(settings, registry)?;
    lookup_modifier(settings)?;

    let lookup_key = user_lookup_attribute(settings, &model);
    if model.field(&lookup_key).is_none() {
        return Err(ConfigurationError::unknown_lookup_field(
            lookup_key,
            model.label().to_string(),
        ));
    }

    let mut unknown = Vec::new();
    for (idp_attribute, targets) in attribute_mapping.iter() {
        for target in targets {
            if !model.resolves(target) {
                tracing::warn!(
                    target: LOG_TARGET,
                    model = %model.label(),
                    idp_attribute,
                    field = %target,
                    "Attribute mapping targets an unknown field"
                );
                unknown.push(target.clone());
            }
        }
    }
    Ok(unknown)
}
