//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Body of every error response: `{"error": {"message": .., "status": ..}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// A string, or the list of violations for validation failures
    pub message: Value,
    pub status: u16,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {}", .violations.join(", "))]
    Validation { violations: Vec<String> },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error carrying every violation found
    pub fn validation<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            violations: violations.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = ?self,
                "request failed"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "request rejected"
            );
        }

        let message = match self {
            AppError::Validation { violations } => Value::from(violations),
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Conflict { message } => Value::String(message),
            // Internal details stay in the logs for release builds
            AppError::Internal(_) if cfg!(not(debug_assertions)) => {
                Value::String("An internal server error occurred".to_string())
            }
            AppError::Internal(e) => Value::String(format!("{:#}", e)),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                message,
                status: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}
