#![allow(clippy::needless_for_each)]

use super::handlers::{admin_users, auth, health, user, UserView};
use crate::{auth::Principal, store::Role};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::profile,
        admin_users::list,
        admin_users::create,
        admin_users::get,
        admin_users::update,
        admin_users::delete,
        admin_users::toggle,
        user::me,
    ),
    components(
        schemas(
            health::Health,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            admin_users::UserRequest,
            UserView,
            Principal,
            Role,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and profile"),
        (name = "admin", description = "Account management, ADMIN only"),
        (name = "user", description = "Caller identity, USUARIO only"),
        (name = "health", description = "Liveness"),
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
