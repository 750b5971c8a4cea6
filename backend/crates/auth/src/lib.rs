//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Phone + OTP sign-in (first verification also signs the user up)
//! - Optional password credential as an alternative sign-in path
//! - Server-side revocable sessions (signed token + per-login auth key)
//! - Two signed cookies carry the credential pair
//!
//! ## Security Model
//! - Session token is HMAC-signed and time-limited; verification is pure
//! - A session is live only while the store holds (subject, auth key) -> token
//! - Revocation (sign-out, password change, ban) deletes store entries,
//!   invalidating tokens before their expiry
//! - OTP codes live 120 seconds, one outstanding code per phone

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::auth_router;

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
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
