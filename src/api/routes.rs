//! Router assembly and shared application state

use crate::auth::{api as auth_api, auth_middleware, AccessGate};
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Refresh-cookie attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_secs: i64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            max_age_secs: 24 * 60 * 60,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AccessGate>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(gate: Arc<AccessGate>, cookies: CookieSettings) -> Self {
        Self { gate, cookies }
    }
}

/// Health check - GET /health
async fn health_check() -> &'static str {
    "ok"
}

pub fn build_router(state: AppState) -> Router {
    // Credential endpoints (no bearer token required)
    let auth_router = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/refresh", post(auth_api::refresh))
        .route("/api/auth/logout", post(auth_api::logout))
        .with_state(state.clone());

    // Protected API routes
    let protected_routes = Router::new()
        .route("/api/user/info", get(auth_api::get_user_info))
        .route("/api/auth/codes", get(auth_api::get_access_codes))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .merge(auth_router)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}
