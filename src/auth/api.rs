//! Authentication API Endpoints
//! Mission: Login, token refresh, logout and the gated user endpoints

use crate::api::{
    response::{success, ApiError},
    routes::{AppState, CookieSettings},
};
use crate::auth::{
    models::{LoginRequest, LoginResponse, UserInfo},
    user_store::sanitize,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, error, info, warn};

/// Name of the HttpOnly cookie carrying the refresh token
pub const REFRESH_COOKIE_NAME: &str = "jwt";

fn refresh_cookie(token: String, settings: &CookieSettings) -> Cookie<'static> {
    // Browsers drop SameSite=None cookies without Secure.
    let same_site = if settings.secure {
        SameSite::None
    } else {
        SameSite::Lax
    };

    Cookie::build((REFRESH_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(same_site)
        .max_age(cookie::time::Duration::seconds(settings.max_age_secs))
        .build()
}

fn clear_refresh_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(REFRESH_COOKIE_NAME).path("/"))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let payload = payload.unwrap_or_else(|rejection| {
        debug!("Unreadable login body: {}", rejection.body_text());
        Json(LoginRequest::default())
    });
    let Json(LoginRequest { username, password }) = payload;

    let (Some(username), Some(password)) = (
        username.filter(|u| !u.is_empty()),
        password.filter(|p| !p.is_empty()),
    ) else {
        return ApiError::bad_request(
            "BadRequestException",
            "Username and password are required",
        )
        .into_response();
    };

    info!("🔐 Login attempt: {}", username);

    let users = state.gate.users();
    let Some(user) = users.authenticate_password(&username, &password) else {
        warn!("❌ Failed login attempt: {}", username);
        return (
            clear_refresh_cookie(jar),
            ApiError::forbidden_with("Username or password is incorrect."),
        )
            .into_response();
    };

    let codec = state.gate.codec();
    let (access, refresh) = match (codec.issue_access(user), codec.issue_refresh(user)) {
        (Ok(access), Ok(refresh)) => (access, refresh),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to issue tokens for {}: {:#}", user.username, e);
            return ApiError::internal().into_response();
        }
    };

    info!(
        "✅ Login successful: {} ({})",
        user.username,
        user.roles.join(",")
    );

    let jar = jar.add(refresh_cookie(refresh.token, &state.cookies));
    let body = LoginResponse {
        user: sanitize(user),
        access_token: access.token,
    };
    (jar, success(body)).into_response()
}

/// Refresh endpoint - POST /api/auth/refresh
/// Reads the refresh token from its cookie and answers with a new access
/// token as a plain-text body.
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = jar.get(REFRESH_COOKIE_NAME).map(|c| c.value().to_string()) else {
        return ApiError::forbidden().into_response();
    };

    let Ok(info) = state.gate.verify_refresh(&token) else {
        return (clear_refresh_cookie(jar), ApiError::forbidden()).into_response();
    };

    let Some(user) = state.gate.users().find_by_username(&info.username) else {
        return (clear_refresh_cookie(jar), ApiError::forbidden()).into_response();
    };

    let access = match state.gate.codec().issue_access(user) {
        Ok(access) => access,
        Err(e) => {
            error!("Failed to issue access token for {}: {:#}", user.username, e);
            return ApiError::internal().into_response();
        }
    };

    info!("🔄 Access token refreshed for {}", user.username);

    let jar = jar.add(refresh_cookie(token, &state.cookies));
    (jar, access.token).into_response()
}

/// Logout endpoint - POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> Response {
    if jar.get(REFRESH_COOKIE_NAME).is_none() {
        return success("").into_response();
    }
    (clear_refresh_cookie(jar), success("")).into_response()
}

/// Current user - GET /api/user/info (behind auth middleware)
pub async fn get_user_info(Extension(user): Extension<UserInfo>) -> Response {
    success(user).into_response()
}

/// Permission codes - GET /api/auth/codes (behind auth middleware)
pub async fn get_access_codes(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Response {
    success(state.gate.users().codes_for(&user.username)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let settings = CookieSettings {
            secure: true,
            max_age_secs: 86_400,
        };
        let set = refresh_cookie("tok".to_string(), &settings);

        assert_eq!(set.name(), "jwt");
        assert_eq!(set.value(), "tok");
        assert_eq!(set.http_only(), Some(true));
        assert_eq!(set.secure(), Some(true));
        assert_eq!(set.same_site(), Some(SameSite::None));
        assert_eq!(
            set.max_age(),
            Some(cookie::time::Duration::seconds(86_400))
        );
    }

    #[test]
    fn test_insecure_cookie_falls_back_to_lax() {
        let settings = CookieSettings {
            secure: false,
            max_age_secs: 60,
        };
        let set = refresh_cookie("tok".to_string(), &settings);
        assert_eq!(set.secure(), Some(false));
        assert_eq!(set.same_site(), Some(SameSite::Lax));
    }
}
