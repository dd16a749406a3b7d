//! Application error type.
//!
//! Every failure a service can report (bad credentials, a missing user, a task that does
//! not exist, an ownership check that failed, an expired reset token) is a variant of
//! `AppError`, so handlers simply return `Result<_, AppError>` and let Actix render the
//! response.
//!
//! `AppError` implements `actix_web::error::ResponseError`, mapping each variant onto the
//! status code the HTTP API promises, with a `{"error": "..."}` JSON body.
//! `From` implementations for `sqlx`, `validator`, `jsonwebtoken`, `bcrypt`, `lettre`
//! and `reqwest` errors allow easy conversion using the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Bad credentials or a missing/malformed/expired bearer token (HTTP 400).
    Authentication(String),
    /// A malformed or otherwise invalid request (HTTP 400).
    BadRequest(String),
    /// Generic unauthorized access (HTTP 401).
    Unauthorized(String),
    /// The acting user does not own or is not assigned to the resource (HTTP 401).
    AccessDenied(String),
    /// A password reset token was presented after its expiry date (HTTP 401).
    PasswordResetTokenExpired(String),
    /// The token subject or email no longer maps to an account (HTTP 204).
    UsernameNotFound(String),
    /// No task exists with the requested id (HTTP 204).
    NoSuchTask(String),
    /// No project exists with the requested id (HTTP 204).
    NoSuchProject(String),
    /// A requested record was not found (HTTP 404).
    NotFound(String),
    /// Input validation failed (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// An error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// The mail server or chat-completion API failed (HTTP 500).
    Upstream(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl AppError {
    fn message(&self) -> &str {
        match self {
            AppError::Authentication(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::AccessDenied(msg)
            | AppError::PasswordResetTokenExpired(msg)
            | AppError::UsernameNotFound(msg)
            | AppError::NoSuchTask(msg)
            | AppError::NoSuchProject(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg)
            | AppError::DatabaseError(msg)
            | AppError::Upstream(msg)
            | AppError::InternalServerError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Authentication(msg) => write!(f, "Authentication Error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::AccessDenied(msg) => write!(f, "Access Denied: {}", msg),
            AppError::PasswordResetTokenExpired(msg) => {
                write!(f, "Password Reset Token Expired: {}", msg)
            }
            AppError::UsernameNotFound(msg) => write!(f, "Username Not Found: {}", msg),
            AppError::NoSuchTask(msg) => write!(f, "No Such Task: {}", msg),
            AppError::NoSuchProject(msg) => write!(f, "No Such Project: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// "Not found" style failures answer 204 rather than 404 so that clients can tell
/// "this does not exist" apart from "you cannot see this" (401).
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_)
            | AppError::AccessDenied(_)
            | AppError::PasswordResetTokenExpired(_) => StatusCode::UNAUTHORIZED,
            AppError::UsernameNotFound(_) | AppError::NoSuchTask(_) | AppError::NoSuchProject(_) => {
                StatusCode::NO_CONTENT
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_)
            | AppError::Upstream(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; unique-constraint
/// violations become `AppError::BadRequest`; anything else is a database error.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::BadRequest(db.message().to_string())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT processing failures are authentication failures.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Authentication(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(error: lettre::error::Error) -> AppError {
        AppError::Upstream(format!("Failed to build email: {}", error))
    }
}

impl From<lettre::address::AddressError> for AppError {
    fn from(error: lettre::address::AddressError) -> AppError {
        AppError::Upstream(format!("Invalid email address: {}", error))
    }
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(error: lettre::transport::smtp::Error) -> AppError {
        AppError::Upstream(format!("SMTP error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> AppError {
        AppError::Upstream(format!("Chat completion request failed: {}", error))
    }
}
