//! Commerce Error Types
//!
//! This module provides commerce-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Commerce-specific result type alias
pub type CommerceResult<T> = Result<T, CommerceError>;

/// Commerce-specific error variants
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Course does not exist
    #[error("Course not found")]
    CourseNotFound,

    /// The user has no cart row at all; carts are created with the user,
    /// so this state needs operator attention
    #[error("Cart not found")]
    CartNotFound,

    /// Checkout with an empty cart
    #[error("Cart is empty")]
    CartEmpty,

    /// Course already present in the cart
    #[error("Course is already in the cart")]
    DuplicateCartItem,

    /// Discount code does not exist
    #[error("Discount code not found")]
    DiscountNotFound,

    /// Discount usage cap reached
    #[error("Discount code has no remaining uses")]
    DiscountExhausted,

    /// Discount past its expiry date
    #[error("Discount code has expired")]
    DiscountExpired,

    /// Scoped discount used on a cart without its course
    #[error("Discount code does not apply to this cart")]
    DiscountNotApplicable,

    /// Order does not exist
    #[error("Order not found")]
    OrderNotFound,

    /// Order belongs to another user
    #[error("Order belongs to another user")]
    ForeignOrder,

    /// Admin-only operation attempted by a regular user
    #[error("Administrator access required")]
    AdminOnly,

    /// Payment gateway transport error, timeout, or non-success response
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CommerceError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::CourseNotFound
            | CommerceError::CartNotFound
            | CommerceError::DiscountNotFound
            | CommerceError::OrderNotFound => ErrorKind::NotFound,
            CommerceError::CartEmpty | CommerceError::DuplicateCartItem => ErrorKind::Conflict,
            CommerceError::DiscountExhausted
            | CommerceError::DiscountExpired
            | CommerceError::DiscountNotApplicable
            | CommerceError::ForeignOrder
            | CommerceError::AdminOnly => ErrorKind::Forbidden,
            CommerceError::GatewayUnavailable(_) => ErrorKind::ServiceUnavailable,
            CommerceError::Database(_) | CommerceError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            CommerceError::Database(e) => {
                tracing::error!(error = %e, "Commerce database error");
            }
            CommerceError::Internal(msg) => {
                tracing::error!(message = %msg, "Commerce internal error");
            }
            CommerceError::CartNotFound => {
                // Carts are provisioned with the user; a hole here is data damage
                tracing::error!("Cart missing for an existing user");
            }
            CommerceError::GatewayUnavailable(msg) => {
                tracing::warn!(message = %msg, "Payment gateway failure");
            }
            _ => {
                tracing::debug!(error = %self, "Commerce error");
            }
        }
    }
}

impl IntoResponse for CommerceError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for CommerceError {
    fn from(err: AppError) -> Self {
        CommerceError::Internal(err.to_string())
    }
}
