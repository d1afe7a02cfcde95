use super::UserView;
use crate::{
    auth::{AuthError, AuthService},
    store::{Role, UserRecord},
};
use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "senha", default)]
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(rename = "senha", default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    /// Always `Bearer`.
    pub tipo: String,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "perfil")]
    pub role: Role,
}

impl AuthResponse {
    fn new(user: UserRecord, token: String) -> Self {
        Self {
            token,
            tipo: "Bearer".to_string(),
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/cadastro",
    request_body = RegisterRequest,
    responses (
        (status = 200, description = "Account created", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Validation failed or email already registered", body = String),
    ),
    tag = "auth"
)]
#[instrument(skip(auth))]
pub async fn register(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            "Erro no cadastro: Missing payload".to_string(),
        )
            .into_response();
    };

    match auth
        .register(&request.name, &request.email, &request.password)
        .await
    {
        Ok((user, token)) => Json(AuthResponse::new(user, token)).into_response(),
        Err(AuthError::Internal(err)) => {
            error!("Registration failed: {err:#}");
            (
                StatusCode::BAD_REQUEST,
                "Erro no cadastro: erro interno".to_string(),
            )
                .into_response()
        }
        Err(err) => (StatusCode::BAD_REQUEST, format!("Erro no cadastro: {err}")).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Credentials accepted", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Credenciais inválidas", body = String),
    ),
    tag = "auth"
)]
#[instrument(skip(auth))]
pub async fn login(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let invalid = || (StatusCode::BAD_REQUEST, AuthError::InvalidCredentials.to_string());

    let Some(Json(request)) = payload else {
        return invalid().into_response();
    };

    match auth.login(&request.email, &request.password).await {
        Ok((user, token)) => Json(AuthResponse::new(user, token)).into_response(),
        Err(AuthError::Internal(err)) => {
            error!("Login failed: {err:#}");
            invalid().into_response()
        }
        Err(_) => invalid().into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/perfil",
    responses (
        (status = 200, description = "Profile of the token owner", body = UserView, content_type = "application/json"),
        (status = 400, description = "Token inválido", body = String),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn profile(auth: Extension<Arc<AuthService>>, headers: HeaderMap) -> Response {
    let header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());

    match auth.profile(header).await {
        Ok(user) => Json(UserView::from(user)).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, AuthError::InvalidToken.to_string()).into_response(),
    }
}
