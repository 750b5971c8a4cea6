//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Phone number is on the ban list
    #[error("This phone number is banned")]
    PhoneBanned,

    /// An unexpired OTP already exists for the phone
    #[error("A verification code was already sent")]
    OtpAlreadySent {
        /// Seconds until the outstanding code expires
        remaining_secs: u64,
    },

    /// No live OTP for the phone (never sent, or expired)
    #[error("Verification code has expired")]
    OtpExpired,

    /// Presented code does not match the stored one
    #[error("Verification code is incorrect")]
    OtpMismatch,

    /// Session token/auth key missing, malformed, expired or revoked
    #[error("Session expired")]
    SessionInvalid,

    /// Token subject no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Account is banned
    #[error("Account is banned")]
    AccountBanned,

    /// Wrong password, or password sign-in without a password set
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Invalid phone number format
    #[error("Invalid phone number")]
    InvalidPhone,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::PhoneBanned | AuthError::AccountBanned => ErrorKind::Forbidden,
            AuthError::OtpAlreadySent { .. } => ErrorKind::Conflict,
            AuthError::OtpExpired
            | AuthError::OtpMismatch
            | AuthError::SessionInvalid
            | AuthError::UserNotFound
            | AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::PasswordValidation(_) | AuthError::InvalidPhone => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            // Surface the countdown so the client can display it
            AuthError::OtpAlreadySent { remaining_secs } => {
                err.with_data(serde_json::json!({ "ttl": remaining_secs }))
            }
            _ => err,
        }
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
            AuthError::InvalidCredentials | AuthError::OtpMismatch => {
                tracing::warn!("Failed sign-in attempt");
            }
            AuthError::PhoneBanned | AuthError::AccountBanned => {
                tracing::warn!("Sign-in attempt for banned account");
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
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<crate::domain::value_object::phone::PhoneError> for AuthError {
    fn from(_: crate::domain::value_object::phone::PhoneError) -> Self {
        AuthError::InvalidPhone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(AuthError::PhoneBanned.kind(), ErrorKind::Forbidden);
        assert_eq!(
            AuthError::OtpAlreadySent { remaining_secs: 10 }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(AuthError::SessionInvalid.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::InvalidPhone.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_otp_conflict_carries_ttl() {
        let app_err = AuthError::OtpAlreadySent { remaining_secs: 87 }.to_app_error();
        assert_eq!(app_err.data().unwrap()["ttl"], 87);
    }
}
