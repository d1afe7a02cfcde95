//! Password hashing.
//!
//! Passwords are Argon2id-hashed into PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`) so parameters travel with
//! the hash and can be raised later without invalidating stored credentials.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash,
    PasswordHasher as _, PasswordVerifier, Version,
};
use rand::rngs::OsRng;

/// One-way hash + verify for credentials.
pub trait PasswordHasher: Send + Sync {
    /// # Errors
    /// Returns an error if hashing fails.
    fn hash(&self, raw: &str) -> Result<String>;

    /// Malformed stored hashes never verify.
    fn verify(&self, raw: &str, stored_hash: &str) -> bool;
}

#[derive(Clone, Debug)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, raw: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|_| anyhow!("failed to hash password"))?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, raw: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok()
    }
}
