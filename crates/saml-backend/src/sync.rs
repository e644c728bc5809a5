//! Copying IdP attribute values onto user records.

use saml_core::{AttributeMap, AttributeMapping, LOG_TARGET};
use saml_model::{FieldValue, UserRecord};
use saml_storage::{StorageResult, UserStore};

/// Sets a field, reporting whether its value changed.
///
/// The field holds `value` afterwards either way.
pub fn set_attribute(user: &mut UserRecord, field: &str, value: impl Into<FieldValue>) -> bool {
    let value = value.into();
    if user.get(field) == Some(&value) {
        return false;
    }
    user.set(field, value);
    true
}

/// Applies `attribute_mapping` to `user` and saves it if anything changed.
///
/// Entries are processed in declaration order. For each target:
///
/// - the lookup key is skipped, it was already used to find or create the record;
/// - a hook is invoked with every asserted value and always counts as a change;
/// - a field is set to the first asserted value, converted to the field's kind;
/// - anything else is logged and skipped.
///
/// Attributes that are missing or asserted without values leave their targets
/// untouched. The record is written once, at the end, if a value changed, if
/// `force_save` is set, or if it was never persisted.
///
/// Returns whether the record was written.
///
/// ## Errors
///
/// Returns the store error if the write fails.
pub async fn update_user(
    store: &dyn UserStore,
    user: &mut UserRecord,
    attributes: &AttributeMap,
    attribute_mapping: &AttributeMapping,
    lookup_key: &str,
    force_save: bool,
) -> StorageResult<bool> {
    let mut has_updated_fields = false;

    for (idp_attribute, targets) in attribute_mapping.iter() {
        let values = match attributes.get(idp_attribute) {
            Some(values) if !values.is_empty() => values,
            _ => {
                tracing::debug!(
                    target: LOG_TARGET,
                    "Could not find value for \"{idp_attribute}\", not updating fields \"{targets:?}\""
                );
                continue;
            }
        };

        for target in targets {
            if target == lookup_key {
                continue;
            }
            has_updated_fields |= apply_target(user, target, values);
        }
    }

    if has_updated_fields || force_save || !user.is_persisted() {
        store.save(user).await?;
        return Ok(true);
    }
    Ok(false)
}

fn apply_target(user: &mut UserRecord, target: &str, values: &[String]) -> bool {
    if let Some(hook) = user.hook(target) {
        hook(user, values);
        return true;
    }

    if !user.has_field(target) {
        tracing::debug!(
            target: LOG_TARGET,
            "Could not find attribute \"{target}\" on user \"{user}\""
        );
        return false;
    }

    let Some(raw) = values.first().map(String::as_str) else {
        return false;
    };
    let value = match user.model().field(target) {
        Some(def) => match def.kind.convert(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(
                    target: LOG_TARGET,
                    "Could not set attribute \"{target}\" on user \"{user}\": {e}"
                );
                return false;
            }
        },
        None => FieldValue::from(raw),
    };
    set_attribute(user, target, value)
}
