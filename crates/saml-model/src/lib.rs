//! # saml-model
//!
//! User models and records for the SAML2 identity backend.
//!
//! Field access is explicit: a [`ModelDescriptor`] declares typed fields and
//! named hooks, and a [`UserRecord`] is read and written by field name
//! through it. The [`ModelRegistry`] resolves configured model identifiers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod field;
pub mod registry;
pub mod user;

pub use field::{FieldDef, FieldKind, FieldValue, InvalidFieldValue};
pub use registry::ModelRegistry;
pub use saml_core::{AttributeMap, AttributeMapping};
pub use user::{
    AttributeHook, ModelBuilder, ModelDescriptor, ModelLabel, UserRecord, DEFAULT_USERNAME_FIELD,
};
