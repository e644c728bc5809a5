//! Customization points of the backend.
//!
//! Deployments customize the login flow by implementing [`BackendHooks`] and
//! overriding the methods they care about; every method has a default.

use std::sync::Arc;

use async_trait::async_trait;
use saml_core::{AttributeMap, AttributeMapping};
use saml_model::{FieldValue, ModelDescriptor, UserRecord};
use saml_storage::{Lookup, StorageResult, UserStore};

use crate::provision::{self, LookupResult};

/// Overridable steps of an authentication attempt.
#[async_trait]
pub trait BackendHooks: Send + Sync {
    /// Filters or transforms the asserted attributes.
    ///
    /// Runs once per attempt, before authorization and synchronization.
    fn clean_attributes(
        &self,
        attributes: AttributeMap,
        _idp_entity_id: Option<&str>,
    ) -> AttributeMap {
        attributes
    }

    /// Decides whether the attempt may proceed.
    ///
    /// Consulted before any record is looked up, created or modified.
    fn is_authorized(
        &self,
        _attributes: &AttributeMap,
        _attribute_mapping: &AttributeMapping,
        _idp_entity_id: Option<&str>,
    ) -> bool {
        true
    }

    /// Normalizes the lookup value before it is used.
    fn clean_user_main_attribute(&self, main_attribute: String) -> String {
        main_attribute
    }

    /// Final gate on the resolved user.
    ///
    /// Rejects records whose `is_active` field holds `false`.
    fn user_can_authenticate(&self, user: &UserRecord) -> bool {
        user.get("is_active")
            .and_then(FieldValue::as_bool)
            .unwrap_or(true)
    }

    /// Finds or creates the user for a lookup.
    ///
    /// A created record may be returned unsaved. The backend inserts it
    /// together with its synchronized attributes in a single write.
    async fn get_or_create_user(
        &self,
        store: &dyn UserStore,
        model: &Arc<ModelDescriptor>,
        lookup: &Lookup,
        create_unknown_user: bool,
    ) -> StorageResult<LookupResult> {
        provision::get_or_build_user(store, model, lookup, create_unknown_user).await
    }
}

/// Hooks with every default in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl BackendHooks for DefaultHooks {}
