//! Registration, login and profile resolution.
//!
//! [`AuthService`] orchestrates the credential store, password hasher and token
//! codec. Errors are deliberately coarse: callers can tell a duplicate email
//! apart from bad input, but never an unknown account from a wrong password.

mod error;
mod principal;
mod service;
pub(crate) mod validation;

pub use error::AuthError;
pub use principal::Principal;
pub use service::{AccountInput, AuthService};
