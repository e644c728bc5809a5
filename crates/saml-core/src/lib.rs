//! # saml-core
//!
//! Settings, configuration errors and logging conventions shared by the
//! SAML2 identity backend crates.
//!
//! The backend never reads ambient global state: callers load a
//! [`Saml2Settings`] value and pass it into every authentication attempt.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod attributes;
pub mod config;
pub mod error;

pub use attributes::{AttributeMap, AttributeMapping};
pub use config::Saml2Settings;
pub use error::{ConfigResult, ConfigurationError};

/// Log target used for every diagnostic emitted by the backend.
///
/// Subscribers can filter on it (`RUST_LOG=saml2=debug`).
pub const LOG_TARGET: &str = "saml2";
