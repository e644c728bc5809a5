//! In-memory user store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use saml_model::{ModelLabel, UserRecord};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::user::{Lookup, UserStore};

/// User store backed by process memory.
///
/// Enforces uniqueness of each model's natural identifier field and counts
/// writes so callers can observe whether a flow persisted anything.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: RwLock<HashMap<Uuid, UserRecord>>,
    writes: AtomicUsize,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successful inserts and updates.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Gets a stored record by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.records.read().get(&id).cloned()
    }

    fn check_unique(
        records: &HashMap<Uuid, UserRecord>,
        user: &UserRecord,
    ) -> StorageResult<()> {
        let Some(field) = user.model().username_field() else {
            return Ok(());
        };
        let Some(value) = user.get(field) else {
            return Ok(());
        };

        let taken = records.values().any(|other| {
            other.id() != user.id()
                && other.model().label() == user.model().label()
                && other.get(field) == Some(value)
        });
        if taken {
            return Err(StorageError::duplicate(field, value.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find(&self, model: &ModelLabel, lookup: &Lookup) -> StorageResult<Vec<UserRecord>> {
        let records = self.records.read();
        let mut found: Vec<UserRecord> = records
            .values()
            .filter(|r| r.model().label() == model && lookup.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(UserRecord::id);
        Ok(found)
    }

    async fn insert(&self, user: &mut UserRecord) -> StorageResult<()> {
        let mut records = self.records.write();
        if user.is_persisted() {
            return Err(StorageError::InvalidData(format!(
                "record '{user}' is already persisted"
            )));
        }
        Self::check_unique(&records, user)?;

        let id = Uuid::now_v7();
        user.assign_id(id);
        records.insert(id, user.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(%id, model = %user.model().label(), "Inserted user record");
        Ok(())
    }

    async fn update(&self, user: &UserRecord) -> StorageResult<()> {
        let mut records = self.records.write();
        let Some(id) = user.id() else {
            return Err(StorageError::InvalidData(format!(
                "record '{user}' has not been inserted"
            )));
        };
        if !records.contains_key(&id) {
            return Err(StorageError::NotFound(id));
        }
        Self::check_unique(&records, user)?;

        records.insert(id, user.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(%id, "Updated user record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use saml_model::ModelDescriptor;

    use super::*;

    fn user(username: &str) -> UserRecord {
        UserRecord::new(Arc::new(ModelDescriptor::auth_user())).with("username", username)
    }

    #[tokio::test]
    async fn insert_assigns_id_and_counts_write() {
        let store = InMemoryUserStore::new();
        let mut john = user("john");

        store.insert(&mut john).await.unwrap();

        assert!(john.is_persisted());
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn insert_rejects_taken_username() {
        let store = InMemoryUserStore::new();
        store.insert(&mut user("john")).await.unwrap();

        let err = store.insert(&mut user("john")).await.unwrap_err();

        assert!(err.is_duplicate());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn find_filters_by_model_and_lookup() {
        let store = InMemoryUserStore::new();
        store.insert(&mut user("john")).await.unwrap();
        store.insert(&mut user("paul")).await.unwrap();

        let label = ModelDescriptor::auth_user().label().clone();
        let found = store
            .find(&label, &Lookup::exact("username", "paul"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].to_string(), "paul");

        let other = saml_model::ModelLabel::new("testprofiles", "TestUser");
        let found = store
            .find(&other, &Lookup::exact("username", "paul"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn update_requires_prior_insert() {
        let store = InMemoryUserStore::new();
        let mut john = user("john");

        assert!(matches!(
            store.update(&john).await,
            Err(StorageError::InvalidData(_))
        ));

        john.assign_id(Uuid::now_v7());
        assert!(store.update(&john).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn save_inserts_then_updates() {
        let store = InMemoryUserStore::new();
        let mut john = user("john");

        store.save(&mut john).await.unwrap();
        john.set("email", "john@example.com");
        store.save(&mut john).await.unwrap();

        let id = john.id().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.get(id).unwrap().get_str("email"), Some("john@example.com"));
    }
}
