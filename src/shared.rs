use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::session::cookie::CookieConfig;
use crate::session::service::SessionService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub cookies: CookieConfig,
}

impl AppState {
    pub fn new(session_service: Arc<SessionService>, cookies: CookieConfig) -> Self {
        Self {
            session_service,
            cookies,
        }
    }
}

/// Domain error taxonomy. Every operation returns these as typed results;
/// the single `IntoResponse` impl below is the only place they become HTTP
/// statuses.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("You are already logged out")]
    AlreadyLoggedOut,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    MissingToken(String),

    #[error("{0}")]
    Expired(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Revocation store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCredentials => {
                // Identical body whether the email is unknown or the password
                // is wrong, so the endpoint cannot be used to enumerate users
                (StatusCode::BAD_REQUEST, "Invalid credentials".to_string())
            }
            AppError::AlreadyLoggedOut => (
                StatusCode::BAD_REQUEST,
                "You are already logged out".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::MissingToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Expired(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::StoreUnavailable(detail) => {
                // Infrastructure failure, not a revoked session: the client
                // should retry, not re-authenticate
                error!(detail = %detail, "Revocation store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            AppError::Database(detail) => {
                error!(detail = %detail, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "message": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::Validation("name too short".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (AppError::AlreadyLoggedOut, StatusCode::BAD_REQUEST),
            (
                AppError::Conflict("duplicate".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                AppError::MissingToken("missing".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Expired("expired".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Forbidden("revoked".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::StoreUnavailable("connection refused".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Database("oops".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let response = AppError::Database("password column corrupt".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body carries only the generic message; detail stays in the logs
    }
}
