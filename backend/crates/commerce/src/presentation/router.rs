//! Commerce Router
//!
//! The gateway callback stays outside the auth layer; everything else
//! requires a resolved identity.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use std::sync::Arc;

use auth::domain::repository::{SessionStore, UserRepository};
use auth::middleware::{AuthGateState, require_auth};

use crate::application::config::CommerceConfig;
use crate::domain::gateway::PaymentGateway;
use crate::domain::repository::{
    CartRepository, CourseAccessRepository, CourseRepository, DiscountRepository, OrderRepository,
    ShortIdAllocator,
};
use crate::infra::http_gateway::HttpPaymentGateway;
use crate::infra::postgres::PgCommerceRepository;
use crate::presentation::handlers::{self, CommerceAppState};

/// Create the Commerce router with PostgreSQL repository and HTTP gateway
pub fn commerce_router<A>(
    repo: PgCommerceRepository,
    gateway: HttpPaymentGateway,
    config: CommerceConfig,
    gate: AuthGateState<A>,
) -> Router
where
    A: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    commerce_router_generic(repo, gateway, config, gate)
}

/// Create a generic Commerce router for any repository/gateway implementation
pub fn commerce_router_generic<R, G, A>(
    repo: R,
    gateway: G,
    config: CommerceConfig,
    gate: AuthGateState<A>,
) -> Router
where
    R: CartRepository
        + CourseRepository
        + DiscountRepository
        + OrderRepository
        + CourseAccessRepository
        + ShortIdAllocator
        + Clone
        + Send
        + Sync
        + 'static,
    G: PaymentGateway + Send + Sync + 'static,
    A: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let state = CommerceAppState {
        repo: Arc::new(repo),
        gateway: Arc::new(gateway),
        config: Arc::new(config),
    };

    let authed = Router::new()
        .route("/cart/items", post(handlers::add_cart_item::<R, G>))
        .route(
            "/cart/items/{course_id}",
            delete(handlers::remove_cart_item::<R, G>),
        )
        .route("/orders", post(handlers::create_order::<R, G>))
        .route("/orders/check/{short_id}", get(handlers::get_order::<R, G>))
        .route(
            "/courses/{course_id}/grants",
            post(handlers::grant_course::<R, G>),
        )
        .route_layer(from_fn_with_state(gate, require_auth::<A>))
        .with_state(state.clone());

    let public = Router::new()
        .route("/orders/verify", get(handlers::verify_order::<R, G>))
        .with_state(state);

    authed.merge(public)
}
