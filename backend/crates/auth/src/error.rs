//! Auth Error Types
//!
//! Auth-specific error variants that render through the unified
//! `kernel::error::AppError` problem-details body.
//!
//! Credential, disabled-account and session failures all surface with the
//! same 401 body so a caller cannot tell which one happened.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

use crate::application::token::TokenEncodeError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Message shared by every sign-in and session failure
const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Correct password on a deactivated account
    #[error("Account is disabled")]
    AccountDisabled,

    /// Refresh credential missing, invalid, expired or revoked
    #[error("Session is invalid or expired")]
    InvalidSession,

    /// No usable access credential on a protected request
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated, but the role is not allowed here
    #[error("Insufficient role")]
    Forbidden,

    /// Administrative action the privilege rules refuse
    #[error("{0}")]
    PrivilegeViolation(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("Email is already registered")]
    EmailTaken,

    /// Input validation error
    #[error("{0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::InvalidSession
            | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::Forbidden | AuthError::PrivilegeViolation(_) => ErrorKind::Forbidden,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Message safe to show to the client
    pub fn public_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::InvalidSession => AUTHENTICATION_FAILED.to_string(),
            AuthError::Database(_) | AuthError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.public_message())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials | AuthError::AccountDisabled => {
                tracing::warn!(reason = %self, "Sign-in rejected");
            }
            AuthError::PrivilegeViolation(msg) => {
                tracing::warn!(message = %msg, "Privilege rule refused an administrative action");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let challenge = self.kind() == ErrorKind::Unauthorized;
        let mut response = self.to_app_error().into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenEncodeError> for AuthError {
    fn from(err: TokenEncodeError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
