//! Account management for `ADMIN` principals. The route policy guarantees the
//! caller's role before any of these run.

use super::UserView;
use crate::{
    auth::{AccountInput, AuthError, AuthService},
    store::Role,
};
use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

/// Create/update payload. On update a blank or missing `senha` keeps the
/// current password.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "senha")]
    pub password: Option<String>,
    #[serde(rename = "perfil")]
    pub role: Option<Role>,
    #[serde(rename = "ativo")]
    pub active: Option<bool>,
}

impl std::fmt::Debug for UserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl From<UserRequest> for AccountInput {
    fn from(request: UserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
            role: request.role.unwrap_or_default(),
            active: request.active.unwrap_or(true),
        }
    }
}

fn error_response(err: AuthError) -> Response {
    match err {
        AuthError::NotFound => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
        AuthError::Internal(err) => {
            error!("Admin operation failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response()
        }
        err => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

fn rejected_payload(rejection: &JsonRejection) -> Response {
    (StatusCode::BAD_REQUEST, rejection.body_text()).into_response()
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses (
        (status = 200, description = "All accounts", body = [UserView]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an ADMIN"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list(auth: Extension<Arc<AuthService>>) -> Response {
    match auth.list_users().await {
        Ok(users) => Json(users.into_iter().map(UserView::from).collect::<Vec<_>>()).into_response(),
        Err(err) => error_response(err),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = UserRequest,
    responses (
        (status = 201, description = "Account created", body = UserView),
        (status = 400, description = "Validation failed or email already registered", body = String),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(auth))]
pub async fn create(
    auth: Extension<Arc<AuthService>>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected_payload(&rejection),
    };

    match auth.create_user(request.into()).await {
        Ok(user) => (StatusCode::CREATED, Json(UserView::from(user))).into_response(),
        Err(err) => error_response(err),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses (
        (status = 200, description = "Account", body = UserView),
        (status = 404, description = "Unknown id", body = String),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn get(auth: Extension<Arc<AuthService>>, Path(id): Path<i64>) -> Response {
    match auth.get_user(id).await {
        Ok(user) => Json(UserView::from(user)).into_response(),
        Err(err) => error_response(err),
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "Account id")),
    request_body = UserRequest,
    responses (
        (status = 200, description = "Account updated", body = UserView),
        (status = 400, description = "Validation failed or email already registered", body = String),
        (status = 404, description = "Unknown id", body = String),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(auth))]
pub async fn update(
    auth: Extension<Arc<AuthService>>,
    Path(id): Path<i64>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected_payload(&rejection),
    };

    match auth.update_user(id, request.into()).await {
        Ok(user) => Json(UserView::from(user)).into_response(),
        Err(err) => error_response(err),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses (
        (status = 204, description = "Account deleted"),
        (status = 404, description = "Unknown id", body = String),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn delete(auth: Extension<Arc<AuthService>>, Path(id): Path<i64>) -> Response {
    match auth.delete_user(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/toggle",
    params(("id" = i64, Path, description = "Account id")),
    responses (
        (status = 200, description = "Active flag flipped", body = UserView),
        (status = 404, description = "Unknown id", body = String),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn toggle(auth: Extension<Arc<AuthService>>, Path(id): Path<i64>) -> Response {
    match auth.toggle_active(id).await {
        Ok(user) => Json(UserView::from(user)).into_response(),
        Err(err) => error_response(err),
    }
}
