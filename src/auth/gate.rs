//! Access Gate
//! Mission: Turn an inbound Authorization header into a sanitized user, or reject it
//!
//! Every failure collapses into [`Unauthenticated`]. The underlying reason is
//! only visible in debug logs.

use crate::auth::{
    jwt::{TokenCodec, VerificationFailure},
    models::{TokenKind, UserInfo},
    user_store::{sanitize, UserStore},
};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub const BEARER_PREFIX: &str = "Bearer ";

/// The single rejection outcome visible to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthenticated;

impl fmt::Display for Unauthenticated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unauthenticated")
    }
}

impl std::error::Error for Unauthenticated {}

/// Internal failure reasons, logged but never returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingCredential,
    MalformedCredential,
    InvalidSignature,
    Expired,
    UnknownSubject,
}

impl From<VerificationFailure> for AuthFailure {
    fn from(failure: VerificationFailure) -> Self {
        match failure {
            VerificationFailure::Malformed => AuthFailure::MalformedCredential,
            VerificationFailure::InvalidSignature => AuthFailure::InvalidSignature,
            VerificationFailure::Expired => AuthFailure::Expired,
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::MissingCredential => write!(f, "missing credential"),
            AuthFailure::MalformedCredential => write!(f, "malformed credential"),
            AuthFailure::InvalidSignature => write!(f, "invalid signature"),
            AuthFailure::Expired => write!(f, "expired credential"),
            AuthFailure::UnknownSubject => write!(f, "unknown subject"),
        }
    }
}

/// Pull the raw token out of an `Authorization: Bearer <token>` header.
///
/// The scheme match is case-sensitive and exactly one space separates it
/// from a non-empty, whitespace-free token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthFailure::MissingCredential)?
        .to_str()
        .map_err(|_| AuthFailure::MalformedCredential)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthFailure::MalformedCredential)?;

    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(AuthFailure::MalformedCredential);
    }
    Ok(token)
}

/// Per-request authentication check shared by every protected route
#[derive(Debug, Clone)]
pub struct AccessGate {
    codec: Arc<TokenCodec>,
    users: Arc<UserStore>,
}

impl AccessGate {
    pub fn new(codec: Arc<TokenCodec>, users: Arc<UserStore>) -> Self {
        Self { codec, users }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// Authenticate a request from its headers using an access token
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<UserInfo, Unauthenticated> {
        self.authenticate_at(headers, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<UserInfo, Unauthenticated> {
        let outcome = bearer_token(headers)
            .and_then(|token| self.resolve(token, TokenKind::Access, now));
        Self::collapse(outcome, TokenKind::Access)
    }

    /// Check a bare refresh token, as read by the token renewal flow
    pub fn verify_refresh(&self, token: &str) -> Result<UserInfo, Unauthenticated> {
        self.verify_refresh_at(token, Utc::now())
    }

    pub fn verify_refresh_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<UserInfo, Unauthenticated> {
        Self::collapse(self.resolve(token, TokenKind::Refresh, now), TokenKind::Refresh)
    }

    fn resolve(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<UserInfo, AuthFailure> {
        let claims = self.codec.verify_at(token, kind, now)?;
        let record = self
            .users
            .find_by_username(claims.username())
            .ok_or(AuthFailure::UnknownSubject)?;
        Ok(sanitize(record))
    }

    fn collapse(
        outcome: Result<UserInfo, AuthFailure>,
        kind: TokenKind,
    ) -> Result<UserInfo, Unauthenticated> {
        outcome.map_err(|reason| {
            debug!(kind = kind.as_str(), %reason, "Rejected credential");
            Unauthenticated
        })
    }
}
