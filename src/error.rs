//! Unified application error types
//!
//! Every HTTP handler returns [`AppError`]; it renders as a JSON body of the
//! form `{"code": "...", "message": "..."}` with a matching status code.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::analytics::AnalyticsError;
use crate::server::ConfigError;
use crate::storage::StorageError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Aggregation or date parameter error
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Persistence error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Socket or file error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or wrong API token
    #[error("missing or invalid API token")]
    Unauthorized,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Serializable error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Analytics(e) => match e {
                AnalyticsError::InvalidDuration { .. } => "INVALID_DURATION",
                AnalyticsError::InvalidWage { .. } => "INVALID_WAGE",
                AnalyticsError::OpenEntry(_) => "OPEN_ENTRY",
                AnalyticsError::InvalidRange { .. } => "INVALID_RANGE",
                AnalyticsError::InvalidDate(_) => "INVALID_DATE",
                AnalyticsError::InvalidPeriod(_) => "INVALID_PERIOD",
            },
            Self::Storage(e) => match e {
                StorageError::Database(_) => "DATABASE_ERROR",
                StorageError::JobNotFound(_) => "JOB_NOT_FOUND",
                StorageError::EntryNotFound(_) => "ENTRY_NOT_FOUND",
                StorageError::InvalidInput(_) => "INVALID_INPUT",
                StorageError::LockError => "LOCK_ERROR",
            },
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Analytics(e) if e.is_data_error() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Analytics(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Storage(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), "Request failed: {}", self);
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
