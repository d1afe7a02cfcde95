//! Credential store contract and implementations.
//!
//! The store owns user records keyed by email. Handlers and the authentication
//! gate only ever talk to the [`CredentialStore`] trait; the binary picks the
//! PostgreSQL implementation when a DSN is configured and the in-memory one
//! otherwise.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    Duplicate(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// Access level of an account. Serialized with the names clients already know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[default]
    #[serde(rename = "USUARIO", alias = "USER")]
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USUARIO",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "USUARIO" | "USER" => Ok(Self::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A stored account. `password_hash` never leaves the service.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .field("role", &self.role)
            .field("active", &self.active)
            .finish()
    }
}

/// Fields for a record about to be inserted; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

/// Full replacement of the mutable fields. `password_hash: None` keeps the
/// current hash.
#[derive(Clone, Debug)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive lookup regardless of the active flag.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Lookup used by authentication: inactive accounts are invisible.
    async fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.find_by_email(email).await?.filter(|user| user.active))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError>;

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Duplicate`] if the email is taken.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Returns `None` when no record has `id`.
    ///
    /// # Errors
    /// Returns [`StoreError::Duplicate`] if the new email belongs to another record.
    async fn update(&self, id: i64, changes: UserChanges)
        -> Result<Option<UserRecord>, StoreError>;

    /// Returns `false` when no record has `id`.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Cheap liveness check for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}
