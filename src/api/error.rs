use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::validation::FieldError;
use super::{MessageResponse, ValidationErrorResponse};
use crate::services::RegistrationError;

/// Body of every 500. Fault details stay in the server log.
pub const SERVER_ERROR_BODY: &str = "Server Error";

#[derive(Debug)]
pub enum ApiError {
    ValidationError(Vec<FieldError>),

    UserExists,

    BadRequest(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(errors) => {
                let params: Vec<&str> = errors.iter().map(|e| e.param).collect();
                write!(f, "Validation error: {}", params.join(", "))
            }
            Self::UserExists => write!(f, "User already exists"),
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse { errors }),
            )
                .into_response(),
            Self::UserExists => (
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new("User already exists")),
            )
                .into_response(),
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(MessageResponse::new(msg))).into_response()
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY).into_response()
            }
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::UserExists => Self::UserExists,
            RegistrationError::Hashing(_) | RegistrationError::Database(_) => {
                Self::InternalError(err.to_string())
            }
        }
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
