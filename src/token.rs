//! Identity token codec.
//!
//! Tokens are compact HS256 JWTs:
//! `base64url(header).base64url(claims).base64url(hmac_sha256(secret, header.claims))`
//!
//! Claims carry the account email as `sub` plus `iat`/`exp` in unix seconds.
//! Signature/structure and expiry are independent checks: [`TokenCodec::decode_subject`]
//! ignores `exp`, and only [`TokenCodec::validate`] combines both.

use jsonwebtoken::{
    decode, encode, errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    time::{Duration, SystemTime},
};
use thiserror::Error;

/// 60 days, the TTL used when no expiration is configured.
pub const DEFAULT_TTL_MS: u64 = 5_184_000_000;

/// HS256 keys shorter than the hash output weaken the MAC.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token")]
    Signing(#[from] JwtError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

/// Issues and verifies identity tokens with a process-wide secret and TTL.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        // Expiry is checked separately so a correctly signed but expired token
        // still decodes to its subject.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject`, valid from now until now + TTL.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be signed.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, now_unix_seconds())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns an error if the claims cannot be signed.
    pub fn issue_at(&self, subject: &str, now: u64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify signature and structure, returning the embedded claims.
    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Malformed)
    }

    /// Return the token subject. Expiry is not considered.
    ///
    /// # Errors
    /// Returns [`TokenError::Malformed`] if the token cannot be parsed or its
    /// signature does not verify.
    pub fn decode_subject(&self, token: &str) -> Result<String, TokenError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// Return the token expiry in unix seconds.
    ///
    /// # Errors
    /// Returns [`TokenError::Malformed`] if the token cannot be parsed or its
    /// signature does not verify.
    pub fn decode_expiry(&self, token: &str) -> Result<u64, TokenError> {
        self.decode_claims(token).map(|claims| claims.exp)
    }

    #[must_use]
    pub fn is_expired(&self, token: &str) -> bool {
        self.is_expired_at(token, now_unix_seconds())
    }

    /// Undecodable tokens count as expired.
    #[must_use]
    pub fn is_expired_at(&self, token: &str, now: u64) -> bool {
        self.decode_expiry(token).map_or(true, |exp| now >= exp)
    }

    /// The only positive-authorization predicate: subject matches and the
    /// token has not expired.
    #[must_use]
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_at(token, expected_subject, now_unix_seconds())
    }

    #[must_use]
    pub fn validate_at(&self, token: &str, expected_subject: &str, now: u64) -> bool {
        match self.decode_subject(token) {
            Ok(subject) => subject == expected_subject && !self.is_expired_at(token, now),
            Err(_) => false,
        }
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"***")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Strip the `Bearer ` prefix from an `Authorization` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

#[must_use]
pub fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
