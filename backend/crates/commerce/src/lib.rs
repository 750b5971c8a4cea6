//! Commerce Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, pricing rules, repository and gateway traits
//! - `application/` - Use cases (cart, checkout, verification, grants)
//! - `infra/` - Database implementations and the HTTP payment gateway
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Transactional model
//! - Checkout prices the cart, redeems an optional discount code with a
//!   single conditional increment, allocates a human-facing order id,
//!   opens a payment intent at the gateway and persists the order in
//!   PAYING state before redirecting the buyer
//! - The gateway callback re-verifies the amount, grants course access
//!   idempotently, clears the cart and flips the order to SUCCESSFUL;
//!   replays of the callback are benign
//! - Every failure inside the callback ends in a redirect, never JSON

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::CommerceConfig;
pub use error::{CommerceError, CommerceResult};
pub use infra::http_gateway::{HttpGatewayConfig, HttpPaymentGateway};
pub use infra::postgres::PgCommerceRepository;
pub use presentation::router::commerce_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgCommerceRepository as CommerceStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}
