//! # saml-backend
//!
//! Reconciles SAML2 identity provider assertions onto local user records.
//!
//! The SAML processing layer validates an assertion and hands over a
//! [`SessionInfo`]; [`Saml2Backend::authenticate`] then
//!
//! 1. cleans the asserted attributes,
//! 2. asks the authorization gate whether to proceed,
//! 3. resolves the user model and its lookup key from settings,
//! 4. extracts and normalizes the lookup value,
//! 5. finds the user or builds a new one,
//! 6. copies mapped attribute values onto it, saving once if anything changed
//!    or the user is new.
//!
//! Every step marked overridable lives on [`BackendHooks`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod backend;
pub mod error;
pub mod hooks;
pub mod provision;
pub mod resolve;
pub mod session;
pub mod sync;

pub use backend::Saml2Backend;
pub use error::{BackendError, BackendResult};
pub use hooks::{BackendHooks, DefaultHooks};
pub use provision::{get_or_build_user, get_or_create_user, LookupResult};
pub use resolve::{saml_user_model, user_lookup_attribute, validate_configuration};
pub use session::SessionInfo;
pub use sync::{set_attribute, update_user};
