//! Auth Router

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/otp/request", post(handlers::request_otp::<R>))
        .route("/otp/verify", post(handlers::verify_otp::<R>))
        .route("/signin", post(handlers::password_sign_in::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .route("/signout/all", post(handlers::sign_out_all::<R>))
        .route("/status", get(handlers::session_status::<R>))
        .route("/password", put(handlers::set_password::<R>))
        .with_state(state)
}
