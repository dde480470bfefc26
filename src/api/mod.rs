//! HTTP surface: response envelope and router assembly

pub mod response;
pub mod routes;

pub use response::ApiError;
pub use routes::{build_router, AppState, CookieSettings};
