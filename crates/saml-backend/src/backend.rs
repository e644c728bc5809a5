//! The SAML2 authentication backend.

use std::fmt;
use std::sync::Arc;

use saml_core::{AttributeMap, AttributeMapping, ConfigResult, Saml2Settings, LOG_TARGET};
use saml_model::{ModelDescriptor, ModelRegistry, UserRecord};
use saml_storage::{Lookup, UserStore};

use crate::error::BackendResult;
use crate::hooks::{BackendHooks, DefaultHooks};
use crate::provision::{self, LookupResult};
use crate::resolve;
use crate::session::SessionInfo;
use crate::sync;

/// Maps validated SAML assertions onto local user records.
///
/// Holds no per-attempt state. Settings are passed into each call and
/// re-read every time.
pub struct Saml2Backend<H = DefaultHooks> {
    registry: Arc<ModelRegistry>,
    store: Arc<dyn UserStore>,
    hooks: H,
}

impl Saml2Backend<DefaultHooks> {
    /// Creates a backend with default hooks.
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>, store: Arc<dyn UserStore>) -> Self {
        Self {
            registry,
            store,
            hooks: DefaultHooks,
        }
    }
}

impl<H: BackendHooks> Saml2Backend<H> {
    /// Replaces the hooks.
    #[must_use]
    pub fn with_hooks<H2: BackendHooks>(self, hooks: H2) -> Saml2Backend<H2> {
        Saml2Backend {
            registry: self.registry,
            store: self.store,
            hooks,
        }
    }

    /// Returns the hooks.
    #[must_use]
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Returns the model registry.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Resolves the user model for SAML logins.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the model does not resolve.
    pub fn user_model(&self, settings: &Saml2Settings) -> ConfigResult<Arc<ModelDescriptor>> {
        resolve::saml_user_model(settings, &self.registry)
    }

    /// Returns the field users are looked up by.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the model does not resolve.
    pub fn lookup_attribute(&self, settings: &Saml2Settings) -> ConfigResult<String> {
        let model = self.user_model(settings)?;
        Ok(resolve::user_lookup_attribute(settings, &model))
    }

    /// Validates settings at startup.
    ///
    /// Returns mapping targets that resolve to nothing on the user model.
    ///
    /// ## Errors
    ///
    /// See [`resolve::validate_configuration`].
    pub fn validate(&self, settings: &Saml2Settings) -> ConfigResult<Vec<String>> {
        resolve::validate_configuration(settings, &self.registry, &settings.attribute_mapping)
    }

    /// Finds or creates the user whose `lookup_key` equals `lookup_value`.
    ///
    /// ## Errors
    ///
    /// Returns configuration and storage errors. Missing and ambiguous users
    /// are `Ok((None, false))`. A created user is inserted before it is
    /// returned.
    pub async fn get_or_create_user(
        &self,
        settings: &Saml2Settings,
        lookup_key: &str,
        lookup_value: &str,
        create_unknown_user: bool,
    ) -> BackendResult<LookupResult> {
        let model = self.user_model(settings)?;
        let lookup = Lookup::exact(lookup_key, lookup_value)
            .with_modifier(resolve::lookup_modifier(settings)?);

        let (mut user, created) = self
            .hooks
            .get_or_create_user(self.store.as_ref(), &model, &lookup, create_unknown_user)
            .await?;
        provision::persist_created(self.store.as_ref(), user.as_mut()).await?;
        Ok((user, created))
    }

    /// Copies mapped attribute values onto `user`, saving it if anything changed.
    ///
    /// Returns whether the record was written.
    ///
    /// ## Errors
    ///
    /// Returns configuration and storage errors.
    pub async fn update_user(
        &self,
        settings: &Saml2Settings,
        user: &mut UserRecord,
        attributes: &AttributeMap,
        attribute_mapping: &AttributeMapping,
        force_save: bool,
    ) -> BackendResult<bool> {
        let lookup_key = resolve::user_lookup_attribute(settings, user.model());
        let written = sync::update_user(
            self.store.as_ref(),
            user,
            attributes,
            attribute_mapping,
            &lookup_key,
            force_save,
        )
        .await?;
        Ok(written)
    }

    /// Authenticates the subject of a validated SAML assertion.
    ///
    /// Returns the local user on success and `None` when the attempt fails:
    /// unauthorized, no usable identifier, unknown user with creation
    /// disabled, ambiguous lookup, or a user that may not log in. Failures are
    /// logged; nothing is written before the authorization check passes, and
    /// a new user is written once, together with its mapped attributes.
    ///
    /// ## Errors
    ///
    /// Returns configuration and storage errors.
    pub async fn authenticate(
        &self,
        settings: &Saml2Settings,
        session_info: &SessionInfo,
        attribute_mapping: &AttributeMapping,
    ) -> BackendResult<Option<UserRecord>> {
        let idp_entity_id = session_info.issuer.as_deref();
        let attributes = self
            .hooks
            .clean_attributes(session_info.ava.clone(), idp_entity_id);
        tracing::debug!(
            target: LOG_TARGET,
            idp = idp_entity_id.unwrap_or("-"),
            attributes = attributes.len(),
            "Processing SAML attributes"
        );

        if !self
            .hooks
            .is_authorized(&attributes, attribute_mapping, idp_entity_id)
        {
            tracing::error!(target: LOG_TARGET, "Request not authorized");
            return Ok(None);
        }

        let model = self.user_model(settings)?;
        let lookup_key = resolve::user_lookup_attribute(settings, &model);
        let modifier = resolve::lookup_modifier(settings)?;

        let lookup_value = self
            .lookup_value(settings, session_info, &attributes, attribute_mapping, &lookup_key)
            .map(|raw| self.hooks.clean_user_main_attribute(raw))
            .filter(|value| !value.is_empty());
        let Some(lookup_value) = lookup_value else {
            tracing::error!(target: LOG_TARGET, "Could not determine user identifier");
            return Ok(None);
        };

        let lookup = Lookup::exact(lookup_key.as_str(), lookup_value).with_modifier(modifier);
        let (user, created) = self
            .hooks
            .get_or_create_user(
                self.store.as_ref(),
                &model,
                &lookup,
                settings.create_unknown_user,
            )
            .await?;
        let Some(mut user) = user else {
            return Ok(None);
        };

        sync::update_user(
            self.store.as_ref(),
            &mut user,
            &attributes,
            attribute_mapping,
            &lookup_key,
            created,
        )
        .await?;

        if !self.hooks.user_can_authenticate(&user) {
            tracing::info!(
                target: LOG_TARGET,
                created,
                "User \"{user}\" is not allowed to authenticate"
            );
            return Ok(None);
        }
        Ok(Some(user))
    }

    fn lookup_value(
        &self,
        settings: &Saml2Settings,
        session_info: &SessionInfo,
        attributes: &AttributeMap,
        attribute_mapping: &AttributeMapping,
        lookup_key: &str,
    ) -> Option<String> {
        if settings.use_name_id_as_username {
            if session_info.name_id.is_none() {
                tracing::error!(
                    target: LOG_TARGET,
                    "The name id is not available. Cannot find user without a name id."
                );
            }
            return session_info.name_id.clone();
        }

        let value = attribute_mapping
            .sources_of(lookup_key)
            .filter_map(|idp_attribute| attributes.get(idp_attribute))
            .last()
            .and_then(|values| values.first().cloned());
        if value.is_none() {
            tracing::error!(
                target: LOG_TARGET,
                field = lookup_key,
                "No attribute value for the lookup field, the session may have expired"
            );
        }
        value
    }
}

impl<H> fmt::Debug for Saml2Backend<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Saml2Backend")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
