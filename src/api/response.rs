//! Response envelope shared by every dashboard endpoint.
//!
//! Success: `{"code":0,"data":..,"error":null,"message":"ok"}`
//! Failure: `{"code":-1,"data":null,"error":..,"message":..}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized Exception";
pub const FORBIDDEN_MESSAGE: &str = "Forbidden Exception";

pub fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({
        "code": 0,
        "data": data,
        "error": null,
        "message": "ok",
    }))
}

pub fn error_body(message: &str, error: Option<&str>) -> Json<Value> {
    Json(json!({
        "code": -1,
        "data": null,
        "error": error,
        "message": message,
    }))
}

/// Non-2xx envelope with an HTTP status attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: &str, error: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            error: Some(error.to_string()),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: UNAUTHORIZED_MESSAGE.to_string(),
            error: Some(UNAUTHORIZED_MESSAGE.to_string()),
        }
    }

    pub fn forbidden() -> Self {
        Self::forbidden_with(FORBIDDEN_MESSAGE)
    }

    pub fn forbidden_with(message: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.to_string(),
            error: Some(message.to_string()),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal Server Error".to_string(),
            error: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            error_body(&self.message, self.error.as_deref()),
        )
            .into_response()
    }
}
