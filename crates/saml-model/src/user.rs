//! User models and user records.
//!
//! A [`ModelDescriptor`] plays the role of a user record *type*: it declares
//! the fields a record carries, which field is the natural identifier, and
//! which named hooks the attribute mapping may target. A [`UserRecord`] is an
//! instance of a descriptor.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::field::{FieldDef, FieldKind, FieldValue};

/// Fallback natural key when neither settings nor the model name one.
pub const DEFAULT_USERNAME_FIELD: &str = "username";

/// A callable target of the attribute mapping.
///
/// Receives the record and every value asserted for the mapped IdP
/// attribute, and performs its own field mutations.
pub type AttributeHook = Arc<dyn Fn(&mut UserRecord, &[String]) + Send + Sync>;

/// The `app_label.model_name` identity of a user model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelLabel {
    /// Application namespace.
    pub app_label: String,
    /// Model name, as declared.
    pub model_name: String,
}

impl ModelLabel {
    /// Creates a label.
    #[must_use]
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into(),
        }
    }

    /// Returns the case-insensitive registry key.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.app_label.to_lowercase(),
            self.model_name.to_lowercase()
        )
    }
}

/// Declaration of a user model.
pub struct ModelDescriptor {
    label: ModelLabel,
    username_field: Option<String>,
    fields: Vec<FieldDef>,
    hooks: HashMap<String, AttributeHook>,
}

impl ModelDescriptor {
    /// Starts declaring a model.
    #[must_use]
    pub fn builder(app_label: impl Into<String>, model_name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            label: ModelLabel::new(app_label, model_name),
            username_field: None,
            fields: Vec::new(),
            hooks: HashMap::new(),
        }
    }

    /// The built-in `auth.User` model.
    #[must_use]
    pub fn auth_user() -> Self {
        Self::builder("auth", "User")
            .username_field(DEFAULT_USERNAME_FIELD)
            .field(DEFAULT_USERNAME_FIELD, FieldKind::Text)
            .field("email", FieldKind::Text)
            .field("first_name", FieldKind::Text)
            .field("last_name", FieldKind::Text)
            .field_def(FieldDef::new("is_active", FieldKind::Boolean).with_default(true))
            .field("is_staff", FieldKind::Boolean)
            .field("is_superuser", FieldKind::Boolean)
            .build()
    }

    /// Returns the model label.
    #[must_use]
    pub const fn label(&self) -> &ModelLabel {
        &self.label
    }

    /// Returns the field the model declares as its natural identifier.
    #[must_use]
    pub fn username_field(&self) -> Option<&str> {
        self.username_field.as_deref()
    }

    /// Iterates over declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter()
    }

    /// Gets a declared field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Gets a named hook.
    #[must_use]
    pub fn hook(&self, name: &str) -> Option<&AttributeHook> {
        self.hooks.get(name)
    }

    /// Checks whether a name resolves to a field or a hook.
    #[must_use]
    pub fn resolves(&self, name: &str) -> bool {
        self.field(name).is_some() || self.hooks.contains_key(name)
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        hooks.sort_unstable();
        f.debug_struct("ModelDescriptor")
            .field("label", &self.label)
            .field("username_field", &self.username_field)
            .field("fields", &self.fields)
            .field("hooks", &hooks)
            .finish()
    }
}

/// Builder for [`ModelDescriptor`].
pub struct ModelBuilder {
    label: ModelLabel,
    username_field: Option<String>,
    fields: Vec<FieldDef>,
    hooks: HashMap<String, AttributeHook>,
}

impl ModelBuilder {
    /// Declares the natural identifier field.
    #[must_use]
    pub fn username_field(mut self, name: impl Into<String>) -> Self {
        self.username_field = Some(name.into());
        self
    }

    /// Declares a field holding its kind's default value.
    #[must_use]
    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.field_def(FieldDef::new(name, kind))
    }

    /// Declares a field.
    #[must_use]
    pub fn field_def(mut self, def: FieldDef) -> Self {
        self.fields.retain(|f| f.name != def.name);
        self.fields.push(def);
        self
    }

    /// Declares a hook the attribute mapping may target.
    #[must_use]
    pub fn hook<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut UserRecord, &[String]) + Send + Sync + 'static,
    {
        self.hooks.insert(name.into(), Arc::new(hook));
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> ModelDescriptor {
        ModelDescriptor {
            label: self.label,
            username_field: self.username_field,
            fields: self.fields,
            hooks: self.hooks,
        }
    }
}

impl fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// An instance of a user model.
///
/// Records start unpersisted (`id() == None`); the store assigns an id when
/// the record is first inserted. Besides the declared fields a record may
/// carry ad-hoc values set at runtime, which are kept but never declared.
#[derive(Debug, Clone)]
pub struct UserRecord {
    id: Option<Uuid>,
    model: Arc<ModelDescriptor>,
    values: BTreeMap<String, FieldValue>,
}

impl UserRecord {
    /// Instantiates a record holding every field's default value.
    #[must_use]
    pub fn new(model: Arc<ModelDescriptor>) -> Self {
        let values = model
            .fields()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect();
        Self {
            id: None,
            model,
            values,
        }
    }

    /// Sets a value, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the store-assigned id.
    #[must_use]
    pub const fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Assigns the store id.
    pub fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }

    /// Checks whether the record has been persisted.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the record's model.
    #[must_use]
    pub fn model(&self) -> &Arc<ModelDescriptor> {
        &self.model
    }

    /// Checks whether the record has a field of that name.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Gets a hook declared by the record's model.
    #[must_use]
    pub fn hook(&self, name: &str) -> Option<AttributeHook> {
        self.model.hook(name).cloned()
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Gets a text field value.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(FieldValue::as_str)
    }

    /// Sets a field value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value of the model's natural identifier field.
    #[must_use]
    pub fn username(&self) -> Option<&FieldValue> {
        let field = self
            .model
            .username_field()
            .unwrap_or(DEFAULT_USERNAME_FIELD);
        self.get(field)
    }
}

impl fmt::Display for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.username() {
            Some(value) => write!(f, "{value}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_model() -> Arc<ModelDescriptor> {
        Arc::new(
            ModelDescriptor::builder("testprofiles", "TestUser")
                .username_field("username")
                .field("username", FieldKind::Text)
                .field("first_name", FieldKind::Text)
                .hook("process_first_name", |user, values| {
                    if let Some(first) = values.first() {
                        user.set("first_name", first.as_str());
                    }
                })
                .build(),
        )
    }

    #[test]
    fn label_renders_lowercase() {
        let label = ModelLabel::new("testprofiles", "TestUser");
        assert_eq!(label.to_string(), "testprofiles.testuser");
        assert_eq!(label.model_name, "TestUser");
    }

    #[test]
    fn new_record_holds_defaults() {
        let user = UserRecord::new(Arc::new(ModelDescriptor::auth_user()));

        assert!(!user.is_persisted());
        assert_eq!(user.get_str("email"), Some(""));
        assert_eq!(user.get("is_active"), Some(&FieldValue::Boolean(true)));
        assert_eq!(user.get("is_staff"), Some(&FieldValue::Boolean(false)));
        assert!(!user.has_field("age"));
    }

    #[test]
    fn display_uses_username_field() {
        let user = UserRecord::new(profile_model()).with("username", "john");
        assert_eq!(user.to_string(), "john");
    }

    #[test]
    fn hooks_mutate_the_record() {
        let mut user = UserRecord::new(profile_model());
        let hook = user.hook("process_first_name").unwrap();

        hook(&mut user, &["John".to_string()]);

        assert_eq!(user.get_str("first_name"), Some("John"));
        assert!(user.model().resolves("process_first_name"));
        assert!(!user.has_field("process_first_name"));
    }

    #[test]
    fn redeclaring_a_field_replaces_it() {
        let model = ModelDescriptor::builder("app", "Person")
            .field("age", FieldKind::Text)
            .field("age", FieldKind::Integer)
            .build();

        assert_eq!(model.fields().count(), 1);
        assert_eq!(model.field("age").map(|f| f.kind), Some(FieldKind::Integer));
    }
}
