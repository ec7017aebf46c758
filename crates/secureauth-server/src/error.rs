//! HTTP error types for the `SecureAuth` server.
//!
//! Every error renders a JSON body with a machine-readable `error` kind and a
//! human-readable `message`. Rejected sign-in forms also carry `fields`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use secureauth_core::auth::FormErrors;
use secureauth_core::error::{AttemptLogError, AuthError, SessionError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The submitted form was rejected.
    InvalidForm(FormErrors),
    /// Client sent something unusable.
    BadRequest(String),
    /// Requested resource not found.
    NotFound(String),
    /// Internal server error.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FormErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, fields) = match self {
            Self::InvalidForm(fields) => (
                StatusCode::BAD_REQUEST,
                "invalid_form",
                fields.to_string(),
                Some(fields),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            error,
            message,
            fields,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidForm(fields) => Self::InvalidForm(fields),
            AuthError::Failed => Self::Internal(err.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<AttemptLogError> for AppError {
    fn from(err: AttemptLogError) -> Self {
        Self::Internal(err.to_string())
    }
}
