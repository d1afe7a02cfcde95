use crate::auth::AuthService;
use anyhow::Result;
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Method, Request, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod gate;
pub(crate) mod handlers;
pub mod policy;

mod openapi;
pub use openapi::openapi;

/// Build the application router.
///
/// Every request is authenticated by [`gate::authenticate`] first and then
/// checked against [`policy::enforce`] before reaching a handler.
pub fn router(auth: Arc<AuthService>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        // allow requests from any origin
        .allow_origin(Any);

    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/login", get(handlers::pages::login))
        .route("/cadastro", get(handlers::pages::register))
        .route("/dashboard", get(handlers::pages::dashboard))
        .route("/admin", get(handlers::pages::admin))
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .route("/api/auth/cadastro", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/perfil", get(handlers::auth::profile))
        .route(
            "/api/admin/users",
            get(handlers::admin_users::list).post(handlers::admin_users::create),
        )
        .route(
            "/api/admin/users/:id",
            get(handlers::admin_users::get)
                .put(handlers::admin_users::update)
                .delete(handlers::admin_users::delete),
        )
        .route(
            "/api/admin/users/:id/toggle",
            post(handlers::admin_users::toggle),
        )
        .route("/api/user/me", get(handlers::user::me))
        .fallback(|| async { StatusCode::NOT_FOUND })
        // Layers run outermost-last: the gate sees the request before the policy.
        .layer(middleware::from_fn(policy::enforce))
        .layer(middleware::from_fn_with_state(
            auth.clone(),
            gate::authenticate,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, auth: Arc<AuthService>) -> Result<()> {
    let app = router(auth);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
