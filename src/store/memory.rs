use super::{CredentialStore, NewUser, StoreError, UserChanges, UserRecord};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, UserRecord>,
}

/// Process-local store used for tests and when no database is configured.
/// Records are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(user.email));
        }

        inner.next_id += 1;
        let record = UserRecord {
            id: inner.next_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            active: user.active,
        };
        inner.users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.users.contains_key(&id) {
            return Ok(None);
        }

        if inner
            .users
            .values()
            .any(|u| u.id != id && u.email == changes.email)
        {
            return Err(StoreError::Duplicate(changes.email));
        }

        let Some(record) = inner.users.get_mut(&id) else {
            return Ok(None);
        };

        record.name = changes.name;
        record.email = changes.email;
        record.role = changes.role;
        record.active = changes.active;
        if let Some(hash) = changes.password_hash {
            record.password_hash = hash;
        }

        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            active: true,
        }
    }

    fn changes(email: &str, active: bool) -> UserChanges {
        UserChanges {
            name: "Ana Maria".to_string(),
            email: email.to_string(),
            role: Role::Admin,
            active,
            password_hash: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let first = store.insert(new_user("a@x.com")).await.unwrap();
        let second = store.insert(new_user("b@x.com")).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.insert(new_user("a@x.com")).await.unwrap();
        let err = store.insert(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(email) if email == "a@x.com"));
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        store.insert(new_user("a@x.com")).await.unwrap();
        assert!(store.exists_by_email("a@x.com").await.unwrap());
        assert!(!store.exists_by_email("A@X.COM").await.unwrap());
    }

    #[tokio::test]
    async fn inactive_records_are_hidden_from_active_lookup() {
        let store = MemoryStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();
        store
            .update(user.id, changes("a@x.com", false))
            .await
            .unwrap();
        assert!(store.find_by_email("a@x.com").await.unwrap().is_some());
        assert!(store.find_active_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_hash_unless_replaced() {
        let store = MemoryStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();

        let updated = store
            .update(user.id, changes("a@x.com", true))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.password_hash, "hash");
        assert_eq!(updated.role, Role::Admin);

        let mut with_password = changes("a@x.com", true);
        with_password.password_hash = Some("new-hash".to_string());
        let updated = store.update(user.id, with_password).await.unwrap().unwrap();
        assert_eq!(updated.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() {
        let store = MemoryStore::new();
        store.insert(new_user("a@x.com")).await.unwrap();
        let other = store.insert(new_user("b@x.com")).await.unwrap();
        let err = store
            .update(other.id, changes("a@x.com", true))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id() {
        let store = MemoryStore::new();
        assert!(store
            .update(42, changes("a@x.com", true))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(42).await.unwrap());
    }

    #[tokio::test]
    async fn update_unknown_id_with_taken_email_is_none() {
        let store = MemoryStore::new();
        store.insert(new_user("a@x.com")).await.unwrap();
        assert!(store
            .update(42, changes("a@x.com", true))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = MemoryStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();
        assert!(store.delete(user.id).await.unwrap());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
    }
}
