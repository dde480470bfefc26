//! Dashboard Auth Library
//!
//! Bearer-token access gate for the admin dashboard backend, plus the
//! login/refresh/logout endpoints and user routes built on top of it.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;

pub use api::{build_router, AppState, CookieSettings};
pub use auth::{AccessGate, TokenCodec, TokenConfig, Unauthenticated, UserInfo, UserStore};
pub use config::Config;
