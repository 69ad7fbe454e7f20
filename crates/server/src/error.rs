//! Unified error handling for the HTTP layer.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use pvz_core::{ErrorKind, PvzError};

use crate::auth::AuthError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reception workflow rejected the request or the store failed.
    #[error(transparent)]
    Domain(#[from] PvzError),

    /// Registration, login or token verification failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Caller lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Domain(e) => match e.kind() {
                ErrorKind::Validation | ErrorKind::InvariantViolation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(e) => match e {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidRole(_)
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::ExpiredToken
                | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Signing(_) | AuthError::PasswordHash | AuthError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "request failed"
            );
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
            self.to_string()
        };

        (status, Json(ErrorBody { message })).into_response()
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

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
