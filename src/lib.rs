//! # Mottu Auth
//!
//! `mottu-auth` is an email/password authentication service. Users register or
//! log in with their email and password and receive a signed JWT bearer token;
//! every later request presents that token in the `Authorization` header.
//!
//! ## Request Authentication
//!
//! Authentication is stateless. Each inbound request passes through the
//! authentication gate ([`api::gate`]), which decodes the bearer token, re-loads
//! the account from the credential store and, when everything checks out,
//! attaches an [`auth::Principal`] to the request. The gate never rejects a
//! request: permit/deny decisions belong to the route policy table
//! ([`api::policy`]) that runs right after it.
//!
//! ## Tokens
//!
//! Tokens are HS256 JWTs carrying the account email as subject plus issued-at
//! and expiry claims ([`token::TokenCodec`]). The signing secret and TTL are
//! read once at startup and never change while the process runs.
//!
//! ## Roles
//!
//! Accounts are either `ADMIN` or `USUARIO`. Admins manage accounts through the
//! `/api/admin/users` endpoints; deactivating an account immediately invalidates
//! every token issued for it.

pub mod api;
pub mod auth;
pub mod cli;
pub mod password;
pub mod store;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
