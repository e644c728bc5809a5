//! Finding or creating the user record for a lookup.

use std::sync::Arc;

use saml_core::LOG_TARGET;
use saml_model::{FieldValue, ModelDescriptor, UserRecord};
use saml_storage::{Lookup, StorageResult, UserStore};

/// Outcome of a user lookup: the record, if any, and whether it was created.
///
/// `(None, false)` covers both "not found and not created" and "ambiguous
/// match"; the two are told apart only by the logged diagnostic.
pub type LookupResult = (Option<UserRecord>, bool);

/// Finds the single record of `model` matching `lookup`, building a new one
/// if allowed.
///
/// A built record holds the lookup value in the lookup field and is **not**
/// persisted; the caller saves it once its attributes are synchronized.
/// A lookup value that cannot be stored in the lookup field fails the
/// attempt like a missing user.
///
/// ## Errors
///
/// Only storage failures are errors. Missing and ambiguous users are logged
/// and reported as `(None, false)`.
pub async fn get_or_build_user(
    store: &dyn UserStore,
    model: &Arc<ModelDescriptor>,
    lookup: &Lookup,
    create_unknown_user: bool,
) -> StorageResult<LookupResult> {
    let label = model.label();
    let mut matches = store.find(label, lookup).await?;

    match matches.len() {
        1 => Ok((matches.pop(), false)),
        0 if create_unknown_user => {
            let value = match model.field(&lookup.field) {
                Some(def) => match def.kind.convert(&lookup.value) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::error!(
                            target: LOG_TARGET,
                            "Could not create user, model: {label}, lookup: {lookup}: {e}"
                        );
                        return Ok((None, false));
                    }
                },
                None => FieldValue::from(lookup.value.as_str()),
            };
            let user = UserRecord::new(Arc::clone(model)).with(lookup.field.as_str(), value);

            tracing::debug!(target: LOG_TARGET, "New user created: {user}");
            Ok((Some(user), true))
        }
        0 => {
            tracing::error!(
                target: LOG_TARGET,
                "The user does not exist, model: {label}, lookup: {lookup}"
            );
            Ok((None, false))
        }
        _ => {
            tracing::error!(
                target: LOG_TARGET,
                "Multiple users match, model: {label}, lookup: {lookup}"
            );
            Ok((None, false))
        }
    }
}

/// Like [`get_or_build_user`], but a created record is inserted before it
/// is returned.
///
/// ## Errors
///
/// Returns the store error if the lookup or the insert fails.
pub async fn get_or_create_user(
    store: &dyn UserStore,
    model: &Arc<ModelDescriptor>,
    lookup: &Lookup,
    create_unknown_user: bool,
) -> StorageResult<LookupResult> {
    let (mut user, created) = get_or_build_user(store, model, lookup, create_unknown_user).await?;
    persist_created(store, user.as_mut()).await?;
    Ok((user, created))
}

/// Inserts `user` if it has never been stored.
pub(crate) async fn persist_created(
    store: &dyn UserStore,
    user: Option<&mut UserRecord>,
) -> StorageResult<()> {
    match user {
        Some(user) if !user.is_persisted() => store.insert(user).await,
        _ => Ok(()),
    }
}
