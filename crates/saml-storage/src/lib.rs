//! # saml-storage
//!
//! Storage abstraction for user records.
//!
//! - [`UserStore`] - lookup, insert and update of user records
//! - [`Lookup`] - single-field equality filter
//! - [`InMemoryUserStore`] - store backed by process memory

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod memory;
pub mod user;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryUserStore;
pub use user::{Lookup, LookupModifier, UserStore};
