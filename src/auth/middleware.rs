//! Authentication Middleware
//! Mission: Protect API endpoints with the access gate

use crate::api::response::ApiError;
use crate::auth::gate::{AccessGate, Unauthenticated};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Validates the bearer token and stores the sanitized user in request
/// extensions for downstream handlers.
pub async fn auth_middleware(
    State(gate): State<Arc<AccessGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Unauthenticated> {
    let user = gate.authenticate(req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        ApiError::unauthorized().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_unauthenticated_response() {
        let resp = Unauthenticated.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
