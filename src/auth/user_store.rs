//! User Directory
//! Mission: Resolve usernames to user records and hand out sanitized copies

use crate::auth::models::{UserInfo, UserRecord};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Errors raised while building a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    DuplicateUsername(String),
    EmptyUsername,
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::DuplicateUsername(name) => write!(f, "Duplicate username: {}", name),
            DirectoryError::EmptyUsername => write!(f, "User record with empty username"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// On-disk seed format
#[derive(Debug, Deserialize)]
struct DirectorySeed {
    users: Vec<UserRecord>,
    #[serde(default)]
    codes: HashMap<String, Vec<String>>,
}

/// Read-only user directory keyed by username
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: HashMap<String, UserRecord>,
    codes: HashMap<String, Vec<String>>,
}

impl UserStore {
    /// Build a directory, rejecting empty and duplicate usernames
    pub fn new(
        users: Vec<UserRecord>,
        codes: HashMap<String, Vec<String>>,
    ) -> Result<Self, DirectoryError> {
        let mut by_name = HashMap::with_capacity(users.len());
        for user in users {
            if user.username.is_empty() {
                return Err(DirectoryError::EmptyUsername);
            }
            if by_name.contains_key(&user.username) {
                return Err(DirectoryError::DuplicateUsername(user.username));
            }
            by_name.insert(user.username.clone(), user);
        }

        Ok(Self {
            users: by_name,
            codes,
        })
    }

    /// Built-in mock directory used when no users file is configured
    pub fn with_mock_users() -> Result<Self, DirectoryError> {
        let users = vec![
            mock_user(0, "vben", "Vben", "super", None),
            mock_user(1, "admin", "Admin", "admin", Some("/workspace")),
            mock_user(2, "jack", "Jack", "user", Some("/analytics")),
        ];
        let codes = HashMap::from([
            (
                "vben".to_string(),
                code_list(&["AC_100100", "AC_100110", "AC_100120", "AC_100010"]),
            ),
            (
                "admin".to_string(),
                code_list(&["AC_100010", "AC_100020", "AC_100030"]),
            ),
            ("jack".to_string(), code_list(&["AC_1000001", "AC_1000002"])),
        ]);

        Self::new(users, codes)
    }

    /// Load a directory from a JSON seed file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read users file {}", path.display()))?;
        let seed: DirectorySeed = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse users file {}", path.display()))?;
        let store = Self::new(seed.users, seed.codes)?;

        info!(
            "👥 Loaded {} users from {}",
            store.users.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    /// Look up a user and check the password in one step
    pub fn authenticate_password(&self, username: &str, password: &str) -> Option<&UserRecord> {
        self.find_by_username(username)
            .filter(|user| user.password == password)
    }

    /// Permission codes for a user; empty for unknown users
    pub fn codes_for(&self, username: &str) -> &[String] {
        self.codes.get(username).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Strip the password from a record. Every record leaving the directory
/// towards a caller goes through here.
pub fn sanitize(record: &UserRecord) -> UserInfo {
    UserInfo::from_record(record)
}

fn mock_user(
    id: u64,
    username: &str,
    real_name: &str,
    role: &str,
    home_path: Option<&str>,
) -> UserRecord {
    UserRecord {
        id,
        username: username.to_string(),
        password: "123456".to_string(),
        real_name: real_name.to_string(),
        roles: vec![role.to_string()],
        home_path: home_path.map(str::to_string),
        avatar: None,
        desc: None,
    }
}

fn code_list(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(username: &str) -> UserRecord {
        UserRecord {
            id: 9,
            username: username.to_string(),
            password: "x".to_string(),
            real_name: "Someone".to_string(),
            roles: vec!["ADMIN".to_string()],
            home_path: Some("/home".to_string()),
            avatar: Some("a.png".to_string()),
            desc: Some("d".to_string()),
        }
    }

    #[test]
    fn test_mock_directory_seeded() {
        let store = UserStore::with_mock_users().unwrap();
        assert_eq!(store.len(), 3);

        let admin = store.find_by_username("admin").unwrap();
        assert_eq!(admin.roles, vec!["admin".to_string()]);
        assert_eq!(admin.home_path.as_deref(), Some("/workspace"));
        assert_eq!(store.codes_for("jack"), ["AC_1000001", "AC_1000002"]);
    }

    #[test]
    fn test_mock_seed_builds_every_user() {
        let store = UserStore::with_mock_users().expect("built-in seed must be valid");
        for name in ["vben", "admin", "jack"] {
            let user = store.find_by_username(name).unwrap();
            assert_eq!(user.password, "123456");
            assert!(!store.codes_for(name).is_empty(), "{} has no codes", name);
        }
    }

    #[test]
    fn test_lookup_miss() {
        let store = UserStore::with_mock_users().unwrap();
        assert!(store.find_by_username("nobody").is_none());
        assert!(store.find_by_username("Admin").is_none());
        assert!(store.codes_for("nobody").is_empty());
    }

    #[test]
    fn test_password_check() {
        let store = UserStore::with_mock_users().unwrap();
        assert!(store.authenticate_password("vben", "123456").is_some());
        assert!(store.authenticate_password("vben", "wrong").is_none());
        assert!(store.authenticate_password("ghost", "123456").is_none());
    }

    #[test]
    fn test_duplicate_usernames_rejected() {
        let err = UserStore::new(vec![record("a"), record("a")], HashMap::new()).unwrap_err();
        assert_eq!(err, DirectoryError::DuplicateUsername("a".to_string()));

        let err = UserStore::new(vec![record("")], HashMap::new()).unwrap_err();
        assert_eq!(err, DirectoryError::EmptyUsername);
    }

    #[test]
    fn test_sanitize_keeps_every_public_field() {
        let rec = record("admin");
        let info = sanitize(&rec);

        assert_eq!(info.id, rec.id);
        assert_eq!(info.username, rec.username);
        assert_eq!(info.real_name, rec.real_name);
        assert_eq!(info.roles, rec.roles);
        assert_eq!(info.home_path, rec.home_path);
        assert_eq!(info.avatar, rec.avatar);
        assert_eq!(info.desc, rec.desc);

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "users": [
                    {{"id": 1, "username": "admin", "password": "x", "roles": ["ADMIN"]}},
                    {{"id": 2, "username": "ops", "password": "y", "realName": "Ops"}}
                ],
                "codes": {{"admin": ["AC_1"]}}
            }}"#
        )
        .unwrap();

        let store = UserStore::from_json_file(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.codes_for("admin"), ["AC_1"]);
        assert_eq!(store.find_by_username("ops").unwrap().real_name, "Ops");
    }

    #[test]
    fn test_load_rejects_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(UserStore::from_json_file(file.path()).is_err());

        assert!(UserStore::from_json_file(Path::new("/definitely/missing.json")).is_err());
    }
}
