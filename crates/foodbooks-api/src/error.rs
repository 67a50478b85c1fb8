//! Error types for foodbooks-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use foodbooks_core::error::{DefaultErrorLogger, ErrorContext, ErrorLogger};
use foodbooks_core::{CoreError, ErrorCode, ErrorDetails};
use foodbooks_parser::ParseError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } | ApiError::Parse(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => status_for(e.code()),
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(e) => e.to_details(),
            ApiError::NotFound { .. } => ErrorDetails::new(ErrorCode::RecordNotFound, self.to_string()),
            ApiError::BadRequest { .. } | ApiError::Parse(_) => {
                ErrorDetails::new(ErrorCode::ValidationError, self.to_string())
            }
            ApiError::InternalError { .. } => ErrorDetails::new(ErrorCode::InternalError, self.to_string()),
        }
    }
}

/// HTTP status for a core error code
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::RecordNotFound => StatusCode::NOT_FOUND,
        ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::RemoteError | ErrorCode::InvalidFormat => StatusCode::BAD_GATEWAY,
        ErrorCode::RemoteUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ConfigError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    error: ErrorDetails,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Core(e) => DefaultErrorLogger.log_error(e, &ErrorContext::new("api")),
            other => log::debug!("request rejected: {}", other),
        }

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            error: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::InternalError {
            message: error.to_string(),
        }
    }
}
