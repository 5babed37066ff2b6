use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Error rendered as `{"error": ...}` where the payload is a message or a
/// list of messages.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: Value,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, error: Value::String(message.into()) }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, message) }

    /// One message renders as a string, several as a list.
    pub fn validation(mut messages: Vec<String>) -> Self {
        let error = if messages.len() == 1 {
            Value::String(messages.remove(0))
        } else {
            Value::from(messages)
        };
        Self { status: StatusCode::BAD_REQUEST, error }
    }

    /// Logs the detail; the client only sees a generic message.
    fn internal(detail: String) -> Self {
        error!(error = %detail, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.error }))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(messages) => Self::validation(messages),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(messages) => Self::validation(messages),
            AuthError::Unauthorized | AuthError::NotFound => {
                Self::unauthorized("no active account found with the given credentials")
            }
            AuthError::TokenError(msg) => Self::unauthorized(msg),
            other => Self::internal(format!("[{}] {}", other.code(), other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}
