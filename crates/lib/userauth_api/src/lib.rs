//! # userauth_api
//!
//! HTTP API library for userauth.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use userauth_core::auth::service::AuthService;

use crate::config::ApiConfig;
use crate::handlers::user;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Auth service over the user directory.
    pub auth: Arc<AuthService>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// State backed by a fresh in-memory user directory.
    pub fn in_memory(config: ApiConfig) -> Self {
        Self {
            auth: Arc::new(AuthService::in_memory(&config.auth)),
            config,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route(routes::POST_USER_SIGN_UP, post(user::sign_up_handler))
        .route(routes::POST_USER_LOGIN, post(user::login_handler))
        .route(routes::POST_USER_REFRESH, post(user::refresh_handler));

    // Bearer token required
    let protected = Router::new()
        .route(routes::GET_USER_ME, get(user::profile_handler))
        .layer(axum::middleware::from_fn(middleware::auth::require_bearer));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        // Outermost, so request traces and error logs carry the id.
        .layer(axum::middleware::from_fn(
            middleware::correlation::correlation_id,
        ))
        .with_state(state)
}
