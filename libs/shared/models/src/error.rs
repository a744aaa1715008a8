use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Business-rule rejection. `code` is machine readable, `details` carries
    /// whatever the caller needs to explain the rejection.
    #[error("Conflict ({code}): {message}")]
    Conflict {
        code: String,
        message: String,
        details: Option<Value>,
    },

    /// Infrastructure fault the caller may retry.
    #[error("Service unavailable ({code}): {message}")]
    Unavailable { code: String, message: String },

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::NotFound(msg) => json!({ "error": msg, "code": "not_found" }),
            AppError::BadRequest(msg) => json!({ "error": msg, "code": "bad_request" }),
            AppError::ValidationError(msg) => json!({ "error": msg, "code": "validation_error" }),
            AppError::Conflict { code, message, details } => json!({
                "error": message,
                "code": code,
                "details": details,
            }),
            AppError::Unavailable { code, message } => json!({
                "error": message,
                "code": code,
                "retryable": true,
            }),
            AppError::Internal(msg) => json!({ "error": msg, "code": "internal" }),
        };

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, self);
        } else {
            tracing::warn!("Request rejected: {}: {}", status, self);
        }

        (status, Json(body)).into_response()
    }
}
