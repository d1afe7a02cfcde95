//! Auth service.
//!
//! Flow Overview:
//! - register: validate input, refuse taken emails, hash, persist as `USUARIO`, issue token.
//! - login: load the active account, verify the password, issue a fresh token.
//! - profile: bearer header -> subject -> active account -> token still valid.
//! - admin: list/create/update/delete/toggle accounts on behalf of an `ADMIN`.

use super::{validation, AuthError, Principal};
use crate::{
    password::PasswordHasher,
    store::{CredentialStore, NewUser, Role, UserChanges, UserRecord},
    token::{bearer_token, TokenCodec},
};
use anyhow::{anyhow, Context};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

// Hashed once with the configured hasher and verified against on failed
// lookups so unknown accounts cost as much as wrong passwords.
const DUMMY_PASSWORD: &str = "mottu-auth-unknown-account";

/// Account fields an administrator supplies when creating or editing a user.
/// A blank or missing `password` on update keeps the current one.
#[derive(Clone, Debug)]
pub struct AccountInput {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
    pub active: bool,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenCodec>,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<TokenCodec>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    // Argon2 is CPU bound; keep it off the async workers.
    async fn hash_password(&self, raw: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let raw = raw.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&raw))
            .await
            .context("password hashing task failed")??;
        Ok(hash)
    }

    async fn verify_password(&self, raw: &str, stored_hash: &str) -> bool {
        let hasher = Arc::clone(&self.hasher);
        let raw = raw.to_string();
        let stored_hash = stored_hash.to_string();
        match tokio::task::spawn_blocking(move || hasher.verify(&raw, &stored_hash)).await {
            Ok(verified) => verified,
            Err(err) => {
                warn!("password verification task failed: {err}");
                false
            }
        }
    }

    async fn verify_dummy(&self, raw: &str) {
        match self
            .dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
            .await
        {
            Ok(hash) => {
                self.verify_password(raw, hash).await;
            }
            Err(err) => warn!("dummy password hash unavailable: {err}"),
        }
    }

    fn issue_token(&self, subject: &str) -> Result<String, AuthError> {
        self.tokens
            .issue(subject)
            .map_err(|err| AuthError::Internal(anyhow!(err)))
    }

    /// Create a `USUARIO` account and return it with a fresh token.
    ///
    /// # Errors
    /// [`AuthError::Validation`] on bad input, [`AuthError::DuplicateEmail`] if
    /// the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(UserRecord, String), AuthError> {
        validation::check_name(name).map_err(AuthError::Validation)?;
        validation::check_email(email).map_err(AuthError::Validation)?;
        validation::check_password(password).map_err(AuthError::Validation)?;

        if self.store.exists_by_email(email).await? {
            debug!("email already registered");
            return Err(AuthError::DuplicateEmail(email.to_string()));
        }

        let password_hash = self.hash_password(password).await?;

        // A concurrent registration can still win the race; the store's
        // uniqueness check surfaces that as DuplicateEmail too.
        let user = self
            .store
            .insert(NewUser {
                name: name.trim().to_string(),
                email: email.to_string(),
                password_hash,
                role: Role::User,
                active: true,
            })
            .await?;

        let token = self.issue_token(&user.email)?;

        info!(user_id = user.id, "user registered");

        Ok((user, token))
    }

    /// Verify credentials and return the account with a fresh token.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] for unknown or inactive accounts and
    /// wrong passwords alike.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(UserRecord, String), AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(user) = self.store.find_active_by_email(email).await? else {
            debug!("login for unknown or inactive account");
            self.verify_dummy(password).await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await {
            debug!(user_id = user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(&user.email)?;

        info!(user_id = user.id, "user logged in");

        Ok((user, token))
    }

    /// Resolve an `Authorization` header value to the caller's account.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`] whenever any step fails.
    pub async fn profile(&self, authorization: Option<&str>) -> Result<UserRecord, AuthError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AuthError::InvalidToken)?;

        let email = self
            .tokens
            .decode_subject(token)
            .map_err(|_| AuthError::InvalidToken)?;

        let user = match self.store.find_active_by_email(&email).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthError::InvalidToken),
            Err(err) => {
                warn!("profile lookup failed: {err}");
                return Err(AuthError::InvalidToken);
            }
        };

        if !self.tokens.validate(token, &user.email) {
            return Err(AuthError::InvalidToken);
        }

        Ok(user)
    }

    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        Ok(self.store.list().await?)
    }

    /// # Errors
    /// [`AuthError::NotFound`] for unknown ids.
    pub async fn get_user(&self, id: i64) -> Result<UserRecord, AuthError> {
        self.store.find_by_id(id).await?.ok_or(AuthError::NotFound)
    }

    /// Create an account with an administrator-chosen role and status.
    ///
    /// # Errors
    /// [`AuthError::Validation`] on bad input (a password is mandatory here),
    /// [`AuthError::DuplicateEmail`] if the email is taken.
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn create_user(&self, input: AccountInput) -> Result<UserRecord, AuthError> {
        validation::check_name(&input.name).map_err(AuthError::Validation)?;
        validation::check_email(&input.email).map_err(AuthError::Validation)?;
        let password = input.password.as_deref().unwrap_or_default();
        validation::check_password(password).map_err(AuthError::Validation)?;

        if self.store.exists_by_email(&input.email).await? {
            return Err(AuthError::DuplicateEmail(input.email));
        }

        let password_hash = self.hash_password(password).await?;
        let user = self
            .store
            .insert(NewUser {
                name: input.name.trim().to_string(),
                email: input.email,
                password_hash,
                role: input.role,
                active: input.active,
            })
            .await?;

        info!(user_id = user.id, "user created by admin");

        Ok(user)
    }

    /// Replace name, email, role and status; re-hash the password only when a
    /// non-blank one is supplied.
    ///
    /// # Errors
    /// [`AuthError::NotFound`], [`AuthError::Validation`] or
    /// [`AuthError::DuplicateEmail`] when the email belongs to another account.
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn update_user(&self, id: i64, input: AccountInput) -> Result<UserRecord, AuthError> {
        validation::check_name(&input.name).map_err(AuthError::Validation)?;
        validation::check_email(&input.email).map_err(AuthError::Validation)?;

        let password_hash = match input.password.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(password) => {
                validation::check_password(password).map_err(AuthError::Validation)?;
                Some(self.hash_password(password).await?)
            }
            None => None,
        };

        let user = self
            .store
            .update(
                id,
                UserChanges {
                    name: input.name.trim().to_string(),
                    email: input.email,
                    role: input.role,
                    active: input.active,
                    password_hash,
                },
            )
            .await?
            .ok_or(AuthError::NotFound)?;

        info!(user_id = user.id, "user updated by admin");

        Ok(user)
    }

    /// # Errors
    /// [`AuthError::NotFound`] for unknown ids.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<(), AuthError> {
        if self.store.delete(id).await? {
            info!(user_id = id, "user deleted by admin");
            Ok(())
        } else {
            Err(AuthError::NotFound)
        }
    }

    /// Flip the active flag. Deactivated accounts stop authenticating at once.
    ///
    /// # Errors
    /// [`AuthError::NotFound`] for unknown ids.
    #[instrument(skip(self))]
    pub async fn toggle_active(&self, id: i64) -> Result<UserRecord, AuthError> {
        let current = self.get_user(id).await?;
        let user = self
            .store
            .update(
                id,
                UserChanges {
                    name: current.name,
                    email: current.email,
                    role: current.role,
                    active: !current.active,
                    password_hash: None,
                },
            )
            .await?
            .ok_or(AuthError::NotFound)?;

        info!(user_id = user.id, active = user.active, "user status toggled");

        Ok(user)
    }

    /// Make sure an `ADMIN` account exists for `email`, creating it if needed.
    /// Existing accounts are left untouched.
    ///
    /// # Errors
    /// Returns an error if the account cannot be created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        if let Some(existing) = self.store.find_by_email(email).await? {
            if existing.role != Role::Admin {
                warn!(user_id = existing.id, "bootstrap admin email belongs to a non-admin account");
            }
            return Ok(Principal::from(&existing));
        }

        let user = self
            .create_user(AccountInput {
                name: "Administrador".to_string(),
                email: email.to_string(),
                password: Some(password.to_string()),
                role: Role::Admin,
                active: true,
            })
            .await?;

        Ok(Principal::from(&user))
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
