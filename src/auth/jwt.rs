//! JWT Token Codec
//! Mission: Issue and verify signed, time-bounded access and refresh tokens

use crate::auth::models::{Claims, TokenKind, UserRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::fmt;
use tracing::debug;

pub const DEFAULT_ACCESS_TTL_DAYS: i64 = 7;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

/// Secrets and lifetimes for both token kinds
#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Config with the default 7-day access / 30-day refresh lifetimes
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: Duration::days(DEFAULT_ACCESS_TTL_DAYS),
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    fn secret(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// An issued, signed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

/// Why a token failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    Malformed,
    InvalidSignature,
    Expired,
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationFailure::Malformed => write!(f, "Malformed token"),
            VerificationFailure::InvalidSignature => write!(f, "Invalid token signature"),
            VerificationFailure::Expired => write!(f, "Token expired"),
        }
    }
}

impl std::error::Error for VerificationFailure {}

struct KindKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KindKeys {
    fn new(config: &TokenConfig, kind: TokenKind) -> Self {
        let secret = config.secret(kind).as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: config.ttl(kind),
        }
    }
}

/// Token codec holding one key set per token kind
pub struct TokenCodec {
    access: KindKeys,
    refresh: KindKeys,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        // Expiry is checked by hand in `verify_at` so the boundary is exact
        // and the clock can be injected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: KindKeys::new(config, TokenKind::Access),
            refresh: KindKeys::new(config, TokenKind::Refresh),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &KindKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn issue_access(&self, user: &UserRecord) -> Result<Credential> {
        self.issue_at(user, TokenKind::Access, Utc::now())
    }

    pub fn issue_refresh(&self, user: &UserRecord) -> Result<Credential> {
        self.issue_at(user, TokenKind::Refresh, Utc::now())
    }

    /// Issue a token of `kind` as if the current time were `now`
    pub fn issue_at(
        &self,
        user: &UserRecord,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Credential> {
        let keys = self.keys(kind);
        let expires_at = now
            .checked_add_signed(keys.ttl)
            .context("Invalid timestamp")?;

        let claims = Claims {
            sub: user.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        debug!(
            "Generating {} JWT for user {}, expires at {}",
            kind.as_str(),
            user.username,
            expires_at
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .context("Failed to generate JWT")?;

        Ok(Credential {
            token,
            kind,
            expires_at,
        })
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, VerificationFailure> {
        self.verify_at(token, kind, Utc::now())
    }

    /// Verify a token of `kind` against the clock value `now`.
    /// A token is expired from its `exp` second onwards.
    pub fn verify_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, VerificationFailure> {
        let decoded = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => VerificationFailure::InvalidSignature,
                _ => VerificationFailure::Malformed,
            })?;

        let claims = decoded.claims;
        if now.timestamp() >= claims.exp {
            return Err(VerificationFailure::Expired);
        }

        debug!("Validated {} JWT for user {}", kind.as_str(), claims.sub);
        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_user() -> UserRecord {
        UserRecord {
            id: 1,
            username: "testuser".to_string(),
            password: "secret".to_string(),
            real_name: "Test".to_string(),
            roles: vec!["user".to_string()],
            home_path: None,
            avatar: None,
            desc: None,
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(&TokenConfig::new("access-test-secret", "refresh-test-secret"))
    }

    #[test]
    fn test_access_round_trip() {
        let codec = codec();
        let user = create_test_user();

        let credential = codec.issue_access(&user).unwrap();
        assert!(!credential.token.is_empty());
        assert_eq!(credential.kind, TokenKind::Access);

        let claims = codec.verify(&credential.token, TokenKind::Access).unwrap();
        assert_eq!(claims.username(), "testuser");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_refresh_lifetime_is_thirty_days() {
        let codec = codec();
        let credential = codec.issue_refresh(&create_test_user()).unwrap();
        let claims = codec.verify(&credential.token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 3600);
    }

    #[test]
    fn test_cross_kind_rejected() {
        let codec = codec();
        let user = create_test_user();

        let access = codec.issue_access(&user).unwrap();
        let refresh = codec.issue_refresh(&user).unwrap();

        assert_eq!(
            codec.verify(&access.token, TokenKind::Refresh),
            Err(VerificationFailure::InvalidSignature)
        );
        assert_eq!(
            codec.verify(&refresh.token, TokenKind::Access),
            Err(VerificationFailure::InvalidSignature)
        );
    }

    #[test]
    fn test_different_secrets_reject() {
        let codec1 = codec();
        let codec2 = TokenCodec::new(&TokenConfig::new("other-access", "other-refresh"));

        let credential = codec1.issue_access(&create_test_user()).unwrap();
        assert_eq!(
            codec2.verify(&credential.token, TokenKind::Access),
            Err(VerificationFailure::InvalidSignature)
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec();
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let credential = codec
            .issue_at(&create_test_user(), TokenKind::Access, issued)
            .unwrap();
        assert_eq!(credential.expires_at, issued + Duration::days(7));

        let just_before = credential.expires_at - Duration::seconds(1);
        assert!(codec
            .verify_at(&credential.token, TokenKind::Access, just_before)
            .is_ok());

        assert_eq!(
            codec.verify_at(&credential.token, TokenKind::Access, credential.expires_at),
            Err(VerificationFailure::Expired)
        );
        assert_eq!(
            codec.verify_at(
                &credential.token,
                TokenKind::Access,
                credential.expires_at + Duration::days(1)
            ),
            Err(VerificationFailure::Expired)
        );
    }

    #[test]
    fn test_token_issued_in_the_past_is_expired_now() {
        let codec = codec();
        let long_ago = Utc::now() - Duration::days(8);
        let credential = codec
            .issue_at(&create_test_user(), TokenKind::Access, long_ago)
            .unwrap();
        assert_eq!(
            codec.verify(&credential.token, TokenKind::Access),
            Err(VerificationFailure::Expired)
        );
    }

    #[test]
    fn test_malformed_token_rejected() {
        let codec = codec();
        assert_eq!(
            codec.verify("invalid.token.here", TokenKind::Access),
            Err(VerificationFailure::Malformed)
        );
        assert_eq!(
            codec.verify("", TokenKind::Access),
            Err(VerificationFailure::Malformed)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let credential = codec.issue_access(&create_test_user()).unwrap();
        let forged = codec
            .issue_at(
                &UserRecord {
                    username: "admin".to_string(),
                    ..create_test_user()
                },
                TokenKind::Access,
                Utc::now(),
            )
            .unwrap();

        // Splice the forged payload onto the original signature.
        let orig: Vec<&str> = credential.token.split('.').collect();
        let other: Vec<&str> = forged.token.split('.').collect();
        let spliced = format!("{}.{}.{}", orig[0], other[1], orig[2]);

        assert_eq!(
            codec.verify(&spliced, TokenKind::Access),
            Err(VerificationFailure::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_algorithm_rejected() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "testuser".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"access-test-secret"),
        )
        .unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(VerificationFailure::InvalidSignature)
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = TokenConfig::new("super-secret-a", "super-secret-b");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("redacted"));
    }
}
