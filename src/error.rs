/// Unified error handling for the token-lifecycle service.
///
/// Every handler returns `Result<HttpResponse, AppError>`; the
/// `ResponseError` impl at the bottom maps the domain errors onto the
/// HTTP taxonomy (400 validation, 401 unauthenticated, 403 forbidden,
/// 500 internal). The precise cause is logged server-side with a generated
/// error id; clients only ever see the generic message for their status
/// class.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    MissingField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "{} is required", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Authentication and authorization errors.
///
/// The variants carry enough distinction for server-side logs; the HTTP
/// mapping deliberately collapses them so a client cannot tell a missing
/// user from a wrong password, or a revoked refresh token from a forged one.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// Unknown username or wrong password (401, same shape for both).
    InvalidCredentials,
    /// Missing/malformed Authorization header or missing cookie (401).
    MissingToken,
    /// Access token failed verification (403).
    InvalidToken,
    /// Refresh token unknown to the store, or stale against it (403).
    StaleRefreshToken,
    /// Authenticated but no permitted role (401, matching the role gate
    /// contract).
    InsufficientRole,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid or expired token"),
            AuthError::StaleRefreshToken => write!(f, "Unknown or stale refresh token"),
            AuthError::InsufficientRole => write!(f, "No permitted role"),
        }
    }
}

impl StdError for AuthError {}

/// Credential store errors
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Malformed(String),
    DuplicateUser(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "user store I/O error: {}", e),
            StoreError::Malformed(msg) => write!(f, "user store is malformed: {}", msg),
            StoreError::DuplicateUser(name) => write!(f, "username already taken: {}", name),
        }
    }
}

impl StdError for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    Store(StoreError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating with server logs
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    fn response_parts(&self) -> (StatusCode, String, String) {
        match self {
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR".to_string(),
                e.to_string(),
            ),
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED".to_string(),
                    "Unauthorized".to_string(),
                ),
                AuthError::MissingToken | AuthError::InsufficientRole => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED".to_string(),
                    "Unauthorized".to_string(),
                ),
                AuthError::InvalidToken | AuthError::StaleRefreshToken => (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN".to_string(),
                    "Forbidden".to_string(),
                ),
            },
            AppError::Store(e) => match e {
                StoreError::DuplicateUser(_) => (
                    StatusCode::CONFLICT,
                    "DUPLICATE_USER".to_string(),
                    e.to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR".to_string(),
                    "Internal server error".to_string(),
                ),
            },
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR".to_string(),
                "Internal server error".to_string(),
            ),
        }
    }

    fn log_error(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication error");
            }
            AppError::Store(StoreError::DuplicateUser(_)) => {
                tracing::warn!(error_id = error_id, error = %self, "Duplicate user attempt");
            }
            AppError::Store(e) => {
                tracing::error!(error_id = error_id, error = %e, "Store error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let (status, code, message) = self.response_parts();
        let body = ErrorResponse::new(error_id, message, code, status.as_u16());

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.response_parts().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display() {
        let err = ValidationError::MissingField("pwd".to_string());
        assert_eq!(err.to_string(), "pwd is required");
    }

    #[test]
    fn unknown_user_and_wrong_password_share_a_status() {
        let unknown: AppError = AuthError::InvalidCredentials.into();
        assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn token_failures_map_to_forbidden() {
        for e in [AuthError::InvalidToken, AuthError::StaleRefreshToken] {
            let app_err: AppError = e.into();
            assert_eq!(app_err.status_code(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn role_denial_reads_as_unauthenticated() {
        let app_err: AppError = AuthError::InsufficientRole.into();
        assert_eq!(app_err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn duplicate_user_maps_to_conflict() {
        let app_err: AppError = StoreError::DuplicateUser("walt".to_string()).into();
        assert_eq!(app_err.status_code(), StatusCode::CONFLICT);
    }
}
