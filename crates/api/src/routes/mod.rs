//! API routes

pub mod admin;
pub mod auth;
pub mod health;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::check_access;
use crate::state::AppState;

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/password-reset", post(auth::request_password_reset))
        .route("/admin/accounts/:id/status", put(admin::set_status))
        .route("/admin/accounts/:id/bypass-link", post(admin::issue_bypass_link))
        // Every route sits behind the gate, admin included.
        .layer(middleware::from_fn_with_state(state.clone(), check_access))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
