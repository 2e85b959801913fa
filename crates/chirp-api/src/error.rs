//! API error type and its HTTP mapping.
//!
//! Handlers return `ApiResult<T>`; every failure becomes a JSON body of the
//! form `{"message": "..."}` with the status of its class.

use axum::{
    Json,
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use chirp_types::api::MessageResponse;

use crate::middleware::AuthFailure;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input (400).
    #[error("{0}")]
    BadRequest(String),

    /// Well-formed input that fails validation (422).
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403).
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Duplicate of a unique entity (409).
    #[error("{0}")]
    Conflict(String),

    /// Anything else (500). The message is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Unique indexes back up the handlers' duplicate checks.
        if chirp_db::is_unique_violation(&err) {
            warn!("Unique constraint violation: {:#}", err);
            return ApiError::conflict("Resource already exists");
        }
        ApiError::Internal(format!("{:#}", err))
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::MissingCredential => ApiError::unauthorized("You are not logged in"),
            AuthFailure::InvalidCredential => ApiError::unauthorized("Invalid or expired token"),
            AuthFailure::RoleDenied => ApiError::forbidden("Forbidden: role not allowed"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::validation(e.body_text()),
            other => ApiError::bad_request(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::bad_request(format!("Invalid form data: {}", err.body_text()))
    }
}
