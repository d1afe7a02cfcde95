//! Authentication gate.
//!
//! Resolves a bearer token to a [`Principal`] and attaches it to the request
//! extensions. The gate never rejects: any failure simply lets the request
//! continue unauthenticated so the route policy can decide.

use crate::{
    auth::{AuthService, Principal},
    token::bearer_token,
};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub async fn authenticate(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    // Read everything needed from the request up front; the body is not Sync
    // so no borrow of it may live across an await.
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let authenticated = request.extensions().get::<Principal>().is_some();

    if let Some(principal) = resolve(&auth, authorization.as_deref(), authenticated).await {
        debug!(user_id = principal.id, "request authenticated");
        request.extensions_mut().insert(principal);
    }

    next.run(request).await
}

async fn resolve(
    auth: &AuthService,
    authorization: Option<&str>,
    authenticated: bool,
) -> Option<Principal> {
    let token = bearer_token(authorization?)?;

    let email = match auth.tokens().decode_subject(token) {
        Ok(email) => email,
        Err(err) => {
            debug!("ignoring undecodable bearer token: {err}");
            return None;
        }
    };

    if authenticated {
        return None;
    }

    // SECURITY: an unknown or deactivated account is not an error here, the
    // request just proceeds without a principal. Protected routes still
    // answer 401, but public routes serve the request as anonymous.
    let account = match auth.store().find_active_by_email(&email).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            debug!("bearer token subject has no active account");
            return None;
        }
        Err(err) => {
            warn!("credential lookup failed: {err}");
            return None;
        }
    };

    if !auth.tokens().validate(token, &account.email) {
        debug!(user_id = account.id, "bearer token rejected");
        return None;
    }

    Some(Principal::from(&account))
}
