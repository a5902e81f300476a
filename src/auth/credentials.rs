//! Persisted user records and the store contract behind them.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::StoreError;

/// A stored account. `password_hash` never leaves the service layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub verified: bool,
}

/// Fields required to create an account.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Public view of a user returned by signup and login.
#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Profile view, including the account flags.
#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub verified: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            verified: user.verified,
        }
    }
}

/// Durable user storage. Email uniqueness is enforced here, not by callers:
/// `insert` must fail with [`StoreError::Conflict`] when the email is taken.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Returns `false` when no user matched.
    async fn mark_verified(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;
    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Addresses of every verified account, oldest first.
    async fn verified_emails(&self) -> Result<Vec<String>, StoreError>;
    /// Reachability check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}
