use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use common::types::ErrorBody;
use service::{auth::errors::AuthError, errors::ServiceError};
use thiserror::Error;
use tracing::{debug, error};

pub const MSG_INVALID_LOGIN: &str = "Invalid email or password";
pub const MSG_EMAIL_TAKEN: &str = "Email already in use";

/// Request-level failure, rendered as `{"error": msg}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// The session names an account that no longer exists.
    #[error("session expired")]
    SessionExpired,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::Model(m) => ApiError::BadRequest(m.to_string()),
            ServiceError::DuplicateEmail(_) => ApiError::Conflict(MSG_EMAIL_TAKEN.into()),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::InvalidCredentials => ApiError::Unauthorized(MSG_INVALID_LOGIN.into()),
            ServiceError::Storage(msg) | ServiceError::Hash(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        debug!(code = e.code(), err = %e, "auth request rejected");
        match e {
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::Conflict => ApiError::Conflict(MSG_EMAIL_TAKEN.into()),
            AuthError::NotFound | AuthError::Unauthorized => ApiError::Unauthorized(MSG_INVALID_LOGIN.into()),
            AuthError::TokenError(_) => ApiError::SessionExpired,
            AuthError::HashError(msg) | AuthError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SessionExpired => return Redirect::to("/login").into_response(),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new("internal error"))).into_response();
            }
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}
