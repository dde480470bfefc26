//! Authentication Module
//! Mission: Bearer-token access gate shared by every protected dashboard route

pub mod api;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use gate::{AccessGate, Unauthenticated};
pub use jwt::{Credential, TokenCodec, TokenConfig, VerificationFailure};
pub use middleware::auth_middleware;
pub use models::{TokenKind, UserInfo, UserRecord};
pub use user_store::{sanitize, UserStore};
