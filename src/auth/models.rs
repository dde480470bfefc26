//! Authentication Models
//! Mission: Define user records, sanitized user info and token payloads

use serde::{Deserialize, Serialize};

/// Directory entry for a dashboard user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String, // never serialize
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// User info safe to hand across a trust boundary.
///
/// Has no password field, so a value of this type can never leak one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: u64,
    pub username: String,
    pub real_name: String,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl UserInfo {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            real_name: record.real_name.clone(),
            roles: record.roles.clone(),
            home_path: record.home_path.clone(),
            avatar: record.avatar.clone(),
            desc: record.desc.clone(),
        }
    }
}

/// The two credential kinds. Each is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub iat: i64,    // issued at, unix seconds
    pub exp: i64,    // expiration, unix seconds
}

impl Claims {
    pub fn username(&self) -> &str {
        &self.sub
    }
}

/// Login request body. Fields are optional so a missing one maps to a 400
/// with the dashboard's own message instead of axum's rejection text. An
/// unreadable body is treated as the empty (default) request.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login payload: the sanitized user plus a fresh access token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserInfo,
    pub access_token: String,
}
