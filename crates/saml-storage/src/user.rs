//! User store trait and lookup filters.

use std::fmt;

use async_trait::async_trait;
use saml_model::{ModelLabel, UserRecord};

use crate::error::StorageResult;

/// How a lookup compares the stored value with the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupModifier {
    /// Exact equality.
    #[default]
    Exact,
    /// Case-insensitive equality.
    IExact,
}

impl LookupModifier {
    /// Parses a lookup suffix (`""`, `"__exact"` or `"__iexact"`).
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "__exact" => Some(Self::Exact),
            "__iexact" => Some(Self::IExact),
            _ => None,
        }
    }

    /// Returns the suffix as rendered in lookups.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Exact => "",
            Self::IExact => "__iexact",
        }
    }
}

/// Equality filter on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Field to filter on.
    pub field: String,
    /// Requested value.
    pub value: String,
    /// Comparison.
    pub modifier: LookupModifier,
}

impl Lookup {
    /// Creates an exact lookup.
    #[must_use]
    pub fn exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            modifier: LookupModifier::Exact,
        }
    }

    /// Sets the comparison.
    #[must_use]
    pub const fn with_modifier(mut self, modifier: LookupModifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Checks whether a record satisfies the filter.
    #[must_use]
    pub fn matches(&self, record: &UserRecord) -> bool {
        let Some(stored) = record.get(&self.field) else {
            return false;
        };
        let stored = stored.to_string();
        match self.modifier {
            LookupModifier::Exact => stored == self.value,
            LookupModifier::IExact => stored.to_lowercase() == self.value.to_lowercase(),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = format!("{}{}", self.field, self.modifier.suffix());
        write!(f, "{{{key:?}: {:?}}}", self.value)
    }
}

/// Store for user records.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns every record of `model` matching `lookup`.
    async fn find(&self, model: &ModelLabel, lookup: &Lookup) -> StorageResult<Vec<UserRecord>>;

    /// Persists a new record and assigns its id.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the record's natural identifier is taken.
    async fn insert(&self, user: &mut UserRecord) -> StorageResult<()>;

    /// Writes an existing record.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the record was never inserted.
    async fn update(&self, user: &UserRecord) -> StorageResult<()>;

    /// Inserts unpersisted records and updates persisted ones.
    async fn save(&self, user: &mut UserRecord) -> StorageResult<()> {
        if user.is_persisted() {
            self.update(user).await
        } else {
            self.insert(user).await
        }
    }
}
