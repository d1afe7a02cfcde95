//! Route policy.
//!
//! Runs after the authentication gate and decides, per path, whether the
//! request may reach its handler. Rules are evaluated in order and the first
//! match wins.

use crate::{auth::Principal, store::Role};
use axum::{
    extract::Request,
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Role(Role),
    Authenticated,
}

/// `(pattern, access)` pairs. A pattern ending in `/**` matches the prefix
/// itself and everything below it; any other pattern matches exactly.
const RULES: &[(&str, Access)] = &[
    ("/api/auth/**", Access::Public),
    ("/", Access::Public),
    ("/login", Access::Public),
    ("/cadastro", Access::Public),
    ("/dashboard", Access::Public),
    ("/admin", Access::Public),
    ("/css/**", Access::Public),
    ("/js/**", Access::Public),
    ("/images/**", Access::Public),
    ("/health", Access::Public),
    ("/api/admin/**", Access::Role(Role::Admin)),
    ("/api/user/**", Access::Role(Role::User)),
];

fn matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix("/**") {
        Some(prefix) => path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        None => pattern == path,
    }
}

#[must_use]
pub fn access_for(path: &str) -> Access {
    RULES
        .iter()
        .find(|(pattern, _)| matches(pattern, path))
        .map_or(Access::Authenticated, |(_, access)| *access)
}

/// Permit or deny based on [`access_for`] and the gate's [`Principal`].
///
/// No principal on a protected route is `401`; a principal lacking the
/// required role is `403`.
pub async fn enforce(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let access = access_for(path);
    let principal = request.extensions().get::<Principal>();

    let allowed = match (access, principal) {
        (Access::Public, _) => true,
        (_, None) => {
            debug!(path, "unauthenticated request to protected route");
            return unauthorized();
        }
        (Access::Authenticated, Some(_)) => true,
        (Access::Role(role), Some(principal)) => principal.has_role(role),
    };

    if allowed {
        next.run(request).await
    } else {
        debug!(path, "principal lacks required role");
        StatusCode::FORBIDDEN.into_response()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        for path in [
            "/",
            "/login",
            "/cadastro",
            "/dashboard",
            "/admin",
            "/health",
            "/api/auth/login",
            "/api/auth/cadastro",
            "/api/auth/perfil",
            "/css/site.css",
            "/js/app/main.js",
            "/images/logo.png",
        ] {
            assert_eq!(access_for(path), Access::Public, "{path}");
        }
    }

    #[test]
    fn role_routes() {
        assert_eq!(access_for("/api/admin/users"), Access::Role(Role::Admin));
        assert_eq!(access_for("/api/admin/users/1/toggle"), Access::Role(Role::Admin));
        assert_eq!(access_for("/api/user/me"), Access::Role(Role::User));
    }

    #[test]
    fn everything_else_requires_authentication() {
        assert_eq!(access_for("/api/other"), Access::Authenticated);
        assert_eq!(access_for("/admin/users"), Access::Authenticated);
        assert_eq!(access_for("/login/extra"), Access::Authenticated);
    }

    #[test]
    fn prefix_rules_respect_segment_boundaries() {
        assert_eq!(access_for("/api/auth"), Access::Public);
        assert_eq!(access_for("/api/authx"), Access::Authenticated);
        assert_eq!(access_for("/api/administrator"), Access::Authenticated);
    }
}
