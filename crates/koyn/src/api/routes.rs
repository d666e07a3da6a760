//! API route definitions.

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AppState;
use crate::auth::auth_middleware;
use crate::notify::SlackNotifier;

/// Create the application router.
///
/// One router carries both public and protected routes: the auth middleware
/// skips public paths and passes unauthenticated requests through, and the
/// `CurrentUser` extractor on protected handlers makes the final call.
pub fn create_router(state: AppState) -> Router {
    // Browsers read the issued credential from the Authorization header.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([AUTHORIZATION]);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let max_body_size = state.config.server.max_upload_size_mb * 1024 * 1024;
    let auth_state = state.auth.clone();
    let notifier = state.notifier.clone();

    Router::new()
        // Public surface
        .route("/health", get(handlers::health))
        .route("/docs", get(handlers::docs))
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/oauth2/{provider}", post(handlers::oauth_login))
        .route("/uploads/{*key}", get(handlers::serve_upload))
        // Users
        .route("/users/me", get(handlers::me))
        // Posts
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/posts/mine", get(handlers::my_posts))
        .route(
            "/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // Files
        .route("/files", get(handlers::list_files).post(handlers::upload_file))
        .route(
            "/files/{id}",
            get(handlers::get_file).delete(handlers::delete_file),
        )
        // News
        .route("/news", get(handlers::list_news))
        .route("/news/{id}", get(handlers::get_news))
        // Exchange
        .route("/exchange/connect", post(handlers::connect_exchange))
        .route("/exchange/status", get(handlers::exchange_status))
        .route("/exchange/wallet", get(handlers::exchange_wallet))
        .route("/exchange", delete(handlers::disconnect_exchange))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .layer(middleware::from_fn_with_state(notifier, error_alert))
        .layer(trace_layer)
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(state)
}

/// Fan out a Slack alert when a response leaves with a 5xx status. The
/// send happens on a detached task; the response is never delayed by it.
async fn error_alert(
    State(notifier): State<Arc<SlackNotifier>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if response.status().is_server_error() {
        let status = response.status();
        tokio::spawn(async move {
            notifier
                .notify_error(
                    &format!("{method} {path} failed"),
                    Some(&format!("status {status}")),
                )
                .await;
        });
    }

    response
}
