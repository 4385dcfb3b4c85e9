//! Route definitions for the Folio HTTP API.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with all routes and the per-request middleware.
///
/// Outermost first: request logging, request id, security headers, rate limit.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(admin_routes())
        .merge(health_routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(axum_middleware::from_fn(
            middleware::security_headers::security_headers,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id::request_id))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Admin auth and session management
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(handlers::admin::login))
        .route("/admin/refresh", post(handlers::admin::refresh))
        .route("/admin/logout", post(handlers::admin::logout))
        .route("/admin/verify", get(handlers::admin::verify))
        .route("/admin/sessions", get(handlers::admin::list_sessions))
        .route(
            "/admin/sessions/revoke-all",
            post(handlers::admin::revoke_all_sessions),
        )
        .route(
            "/admin/sessions/{session_id}",
            delete(handlers::admin::revoke_session),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
