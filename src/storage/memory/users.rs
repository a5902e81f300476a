use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{CredentialStore, NewUser, User};
use crate::storage::StoreError;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the admin flag; there is no API for this.
    pub async fn set_admin(&self, id: Uuid, is_admin: bool) -> bool {
        self.users
            .write()
            .await
            .get_mut(&id)
            .map(|user| user.is_admin = is_admin)
            .is_some()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        // Check and insert under one write guard.
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict);
        }
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: false,
            verified: false,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .users
            .write()
            .await
            .get_mut(&id)
            .map(|user| user.verified = true)
            .is_some())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        Ok(self
            .users
            .write()
            .await
            .get_mut(&id)
            .map(|user| user.password_hash = password_hash.to_string())
            .is_some())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.write().await.get_mut(&id).map(|user| {
            user.name = name.to_string();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn verified_emails(&self) -> Result<Vec<String>, StoreError> {
        let mut emails: Vec<String> = self
            .users
            .read()
            .await
            .values()
            .filter(|user| user.verified)
            .map(|user| user.email.clone())
            .collect();
        // No insertion order in a map; sort for a stable send order.
        emails.sort();
        Ok(emails)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
