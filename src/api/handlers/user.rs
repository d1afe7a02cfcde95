use crate::auth::Principal;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[utoipa::path(
    get,
    path = "/api/user/me",
    responses (
        (status = 200, description = "Identity attached by the authentication gate", body = Principal),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not a USUARIO"),
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn me(principal: Option<Extension<Principal>>) -> Response {
    match principal {
        Some(Extension(principal)) => Json(principal).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}
