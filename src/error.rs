//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! various error conditions that can occur, from database issues to validation failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` to seamlessly convert
//! application errors into appropriate HTTP responses with a JSON `{"detail": ...}`
//! body. It also provides `From` trait implementations for common error types like
//! `sqlx::Error`, `validator::ValidationErrors`, `bcrypt::BcryptError`, and the
//! token layer's `TokenError`, allowing for easy conversion using the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, carrying a message
/// detailing the issue. These errors are then converted into appropriate
/// HTTP responses. Server-side variants (`Database`, `Internal`) keep the
/// detailed message for logging but respond to the client with a generic
/// detail so internals are never leaked.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid, or expired credential, or a subject that no longer
    /// resolves to an active account (HTTP 401).
    Unauthorized(String),
    /// Authenticated caller lacks the required role (HTTP 403).
    Forbidden(String),
    /// Duplicate resource, e.g. signup with an email already taken (HTTP 409).
    Conflict(String),
    /// Client-side error due to a malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// A requested resource was not found (HTTP 404).
    NotFound(String),
    /// Failed input validation from the `validator` crate (HTTP 422).
    Validation(String),
    /// Error originating from database operations (HTTP 500).
    Database(String),
    /// Unexpected server-side error in the hashing/token backends or
    /// elsewhere (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// This implementation allows Actix Web to automatically translate `AppError`
/// results from handlers into the correct HTTP status codes and JSON error
/// responses.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "detail": msg
            })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "detail": msg
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({
                "detail": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "detail": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "detail": msg
            })),
            AppError::Validation(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "detail": msg
            })),
            // The detailed message is logged server-side; the client only
            // ever sees a stable, non-leaking detail.
            AppError::Database(msg) => {
                log::error!("database error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "detail": "Internal server error"
                }))
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "detail": "Internal server error"
                }))
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `AppError::NotFound`, a unique-constraint violation
/// maps to `AppError::Conflict` (the database is the authority on duplicate
/// identifiers), and everything else becomes `AppError::Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Record already exists".into())
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts the token layer's `TokenError` into `AppError::Unauthorized`.
///
/// Every kind maps to the same 401 status but keeps a distinct detail so
/// clients can tell an expired token from an invalid one.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Expired => AppError::Unauthorized("Access token expired".into()),
            TokenError::Malformed => AppError::Unauthorized("Access token invalid".into()),
            TokenError::Unknown => AppError::Unauthorized("Failed to verify access token".into()),
        }
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
///
/// This handles errors during password hashing.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Missing access token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::Forbidden("Admin privileges required".into());
        assert_eq!(error.error_response().status(), 403);

        let error = AppError::Conflict("Account already exists".into());
        assert_eq!(error.error_response().status(), 409);

        let error = AppError::BadRequest("Old password is incorrect".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Task not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::Validation("email: invalid".into());
        assert_eq!(error.error_response().status(), 422);

        let error = AppError::Internal("boom".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[test]
    fn test_token_error_mapping_keeps_distinct_details() {
        let expired = AppError::from(TokenError::Expired);
        let malformed = AppError::from(TokenError::Malformed);
        let unknown = AppError::from(TokenError::Unknown);

        let msg = |e: &AppError| match e {
            AppError::Unauthorized(m) => m.clone(),
            other => panic!("expected Unauthorized, got {:?}", other),
        };

        assert_eq!(expired.error_response().status(), 401);
        assert_eq!(malformed.error_response().status(), 401);
        assert_eq!(unknown.error_response().status(), 401);
        assert_ne!(msg(&expired), msg(&malformed));
        assert_ne!(msg(&expired), msg(&unknown));
    }
}
