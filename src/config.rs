//! Server Configuration
//!
//! Flags with environment fallbacks. Signing secrets have no built-in
//! default and must be supplied via flag, environment or `.env`.

use crate::api::CookieSettings;
use crate::auth::TokenConfig;
use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// Upper bound for token lifetimes (ten years)
pub const MAX_TTL_DAYS: i64 = 3_650;
/// Upper bound for the refresh cookie max-age, same horizon as the tokens
pub const MAX_COOKIE_MAX_AGE_SECS: i64 = MAX_TTL_DAYS * 86_400;

#[derive(Parser, Clone)]
#[command(name = "dashboard-auth", about = "Admin dashboard auth backend")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5320")]
    pub bind: String,

    /// HMAC secret for access tokens
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub access_token_secret: String,

    /// HMAC secret for refresh tokens
    #[arg(long, env = "REFRESH_TOKEN_SECRET", hide_env_values = true)]
    pub refresh_token_secret: String,

    /// Access token lifetime in days
    #[arg(long, env = "ACCESS_TOKEN_TTL_DAYS", default_value_t = 7)]
    pub access_ttl_days: i64,

    /// Refresh token lifetime in days
    #[arg(long, env = "REFRESH_TOKEN_TTL_DAYS", default_value_t = 30)]
    pub refresh_ttl_days: i64,

    /// JSON user directory; the built-in mock users are used when absent
    #[arg(long, env = "USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Refresh cookie max-age in seconds
    #[arg(long, env = "REFRESH_COOKIE_MAX_AGE_SECS", default_value_t = 86_400)]
    pub refresh_cookie_max_age_secs: i64,

    /// Drop the Secure attribute from the refresh cookie (plain-HTTP dev setups)
    #[arg(long, env = "INSECURE_COOKIES")]
    pub insecure_cookies: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptySecret(&'static str),
    SharedSecret,
    NonPositive(&'static str),
    TooLarge(&'static str, i64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptySecret(name) => write!(f, "{} must not be empty", name),
            ConfigError::SharedSecret => write!(
                f,
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ"
            ),
            ConfigError::NonPositive(name) => write!(f, "{} must be positive", name),
            ConfigError::TooLarge(name, max) => write!(f, "{} must be at most {}", name, max),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret("ACCESS_TOKEN_SECRET"));
        }
        if self.refresh_token_secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret("REFRESH_TOKEN_SECRET"));
        }
        // One secret for both kinds would let a refresh token pass as access.
        if self.access_token_secret == self.refresh_token_secret {
            return Err(ConfigError::SharedSecret);
        }
        check_range("ACCESS_TOKEN_TTL_DAYS", self.access_ttl_days, MAX_TTL_DAYS)?;
        check_range("REFRESH_TOKEN_TTL_DAYS", self.refresh_ttl_days, MAX_TTL_DAYS)?;
        check_range(
            "REFRESH_COOKIE_MAX_AGE_SECS",
            self.refresh_cookie_max_age_secs,
            MAX_COOKIE_MAX_AGE_SECS,
        )?;
        Ok(())
    }

    /// Codec settings; runs `validate` first so the TTLs are in range
    pub fn token_config(&self) -> Result<TokenConfig, ConfigError> {
        self.validate()?;
        Ok(TokenConfig {
            access_secret: self.access_token_secret.clone(),
            refresh_secret: self.refresh_token_secret.clone(),
            access_ttl: chrono::Duration::days(self.access_ttl_days),
            refresh_ttl: chrono::Duration::days(self.refresh_ttl_days),
        })
    }

    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            secure: !self.insecure_cookies,
            max_age_secs: self.refresh_cookie_max_age_secs,
        }
    }
}

fn check_range(name: &'static str, value: i64, max: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositive(name));
    }
    if value > max {
        return Err(ConfigError::TooLarge(name, max));
    }
    Ok(())
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("access_ttl_days", &self.access_ttl_days)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .field("users_file", &self.users_file)
            .field("refresh_cookie_max_age_secs", &self.refresh_cookie_max_age_secs)
            .field("insecure_cookies", &self.insecure_cookies)
            .finish_non_exhaustive()
    }
}
