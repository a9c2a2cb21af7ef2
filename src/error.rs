/// Unified error handling for the authentication core.
///
/// Three domain-specific error families feed a single `AppError`:
/// - `ValidationError`: rejected input (400)
/// - `AuthError`: credential and token failures (401/403/409)
/// - `StoreError`: identity-store and ledger-store failures (404/409/503/500)
///
/// Verification failures flow back to middleware as typed results; everything
/// else is raised and converted by the `ResponseError` impl. A revoked session
/// token and a forged one map to the same HTTP payload so callers cannot tell
/// revocation apart from forgery. Expiry stays distinguishable.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    SuspiciousContent(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Bad email/password at login. One message for "no such user" and
    /// "wrong password" to prevent user enumeration.
    InvalidCredentials,
    /// Signature valid but past its expiry claim.
    TokenExpired,
    /// Malformed token or bad signature.
    TokenInvalid,
    /// Signature-valid session token absent from the revocation ledger.
    /// Collapsed with `TokenInvalid` at the HTTP layer.
    TokenRevoked,
    /// API token signed for a different user than the one presenting it.
    OwnershipMismatch,
    /// No Authorization header where one is required.
    MissingToken,
    /// Authenticated but lacking the required role or bearer context.
    Forbidden,
    /// Role promotion target already holds the role (or a higher one).
    AlreadyGranted,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::TokenExpired => write!(f, "Token is expired"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::TokenRevoked => write!(f, "Invalid token"),
            AuthError::OwnershipMismatch => write!(f, "Invalid token"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::Forbidden => write!(f, "You must be logged in to have access"),
            AuthError::AlreadyGranted => write!(f, "Role already granted"),
        }
    }
}

impl StdError for AuthError {}

/// Identity-store and ledger-store errors
#[derive(Debug)]
pub enum StoreError {
    /// Transient backend failure. Always propagated so a half-applied
    /// operation (e.g. a signed token never recorded in the ledger) cannot
    /// be mistaken for success.
    Unavailable(String),
    NotFound(String),
    Duplicate(String),
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::Duplicate(msg) => write!(f, "Duplicate entry: {}", msg),
            StoreError::Query(msg) => write!(f, "Query error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

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

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AppError::Store(StoreError::Duplicate("Email already registered".to_string()))
        } else if error_msg.contains("no rows") {
            AppError::Store(StoreError::NotFound("Record not found".to_string()))
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            AppError::Store(StoreError::Unavailable(error_msg))
        } else {
            AppError::Store(StoreError::Query(error_msg))
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        // Any ledger failure is treated as the store being unavailable; the
        // caller decides whether the operation as a whole fails.
        AppError::Store(StoreError::Unavailable(err.to_string()))
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(message: String, code: String, status: u16) -> Self {
        Self {
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    /// Map to (status, machine code, user-facing message).
    ///
    /// `TokenInvalid`, `TokenRevoked` and `OwnershipMismatch` deliberately
    /// share a code and message.
    fn response_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    e.to_string(),
                ),
                AuthError::TokenExpired => {
                    (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", e.to_string())
                }
                AuthError::TokenInvalid | AuthError::TokenRevoked | AuthError::OwnershipMismatch => {
                    (StatusCode::UNAUTHORIZED, "TOKEN_INVALID", "Invalid token".to_string())
                }
                AuthError::MissingToken => {
                    (StatusCode::UNAUTHORIZED, "MISSING_TOKEN", e.to_string())
                }
                AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string()),
                AuthError::AlreadyGranted => {
                    (StatusCode::CONFLICT, "ALREADY_GRANTED", e.to_string())
                }
            },

            AppError::Store(e) => match e {
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                StoreError::Duplicate(_) => (StatusCode::CONFLICT, "DUPLICATE_ENTRY", e.to_string()),
                StoreError::Unavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Backing store temporarily unavailable".to_string(),
                ),
                StoreError::Query(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Store error occurred".to_string(),
                ),
            },

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "Validation error");
            }
            AppError::Auth(e) => {
                tracing::warn!(error = ?e, "Authentication error");
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "Store error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.log();
        let (status, code, message) = self.response_parts();
        HttpResponse::build(status).json(ErrorResponse::new(
            message,
            code.to_string(),
            status.as_u16(),
        ))
    }

    fn status_code(&self) -> StatusCode {
        self.response_parts().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn revoked_and_invalid_share_a_response() {
        let revoked = AppError::Auth(AuthError::TokenRevoked).response_parts();
        let invalid = AppError::Auth(AuthError::TokenInvalid).response_parts();
        let mismatch = AppError::Auth(AuthError::OwnershipMismatch).response_parts();
        assert_eq!(revoked.1, invalid.1);
        assert_eq!(revoked.2, invalid.2);
        assert_eq!(mismatch.1, invalid.1);
    }

    #[test]
    fn expired_is_distinguishable() {
        let expired = AppError::Auth(AuthError::TokenExpired).response_parts();
        let invalid = AppError::Auth(AuthError::TokenInvalid).response_parts();
        assert_ne!(expired.1, invalid.1);
        assert_eq!(expired.0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn ledger_failure_maps_to_unavailable() {
        let err: AppError = StoreError::Unavailable("connection refused".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
