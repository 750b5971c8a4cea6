//! HTTP Handlers
//!
//! The verify callback handler is the one boundary that never answers
//! JSON: its caller is a buyer's browser coming back from the gateway,
//! so every outcome — including internal errors — becomes a redirect.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use std::sync::Arc;

use auth::middleware::AuthUser;
use kernel::id::CourseId;
use uuid::Uuid;

use auth::domain::value_object::user_id::UserId;

use crate::application::config::CommerceConfig;
use crate::application::{
    AddCartItemOutcome, AddCartItemUseCase, CheckoutInput, CheckoutUseCase, GetOrderUseCase,
    GrantCourseUseCase, RemoveCartItemUseCase, VerifyOutcome, VerifyPaymentUseCase,
};
use crate::domain::gateway::PaymentGateway;
use crate::domain::repository::{
    CartRepository, CourseAccessRepository, CourseRepository, DiscountRepository, OrderRepository,
    ShortIdAllocator,
};
use crate::error::{CommerceError, CommerceResult};
use crate::presentation::dto::{
    AddCartItemRequest, AddCartItemResponse, CreateOrderRequest, CreateOrderResponse,
    GrantCourseRequest, OrderResponse, VerifyQuery,
};

/// Shared state for commerce handlers
pub struct CommerceAppState<R, G>
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
{
    pub repo: Arc<R>,
    pub gateway: Arc<G>,
    pub config: Arc<CommerceConfig>,
}

// Manual impl: the gateway sits behind an Arc, so the state is clonable
// whether or not `G` itself is.
impl<R, G> Clone for CommerceAppState<R, G>
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
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            gateway: self.gateway.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Cart
// ============================================================================

/// POST /api/cart/items
pub async fn add_cart_item<R, G>(
    State(state): State<CommerceAppState<R, G>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AddCartItemRequest>,
) -> CommerceResult<(StatusCode, Json<AddCartItemResponse>)>
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
{
    let use_case = AddCartItemUseCase::new(state.repo.clone());
    let outcome = use_case
        .execute(&user.user_id, &CourseId::from_uuid(req.course_id))
        .await?;

    let response = match outcome {
        AddCartItemOutcome::Added => AddCartItemResponse {
            added: true,
            granted: false,
        },
        AddCartItemOutcome::GrantedFree => AddCartItemResponse {
            added: false,
            granted: true,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/cart/items/{course_id}
pub async fn remove_cart_item<R, G>(
    State(state): State<CommerceAppState<R, G>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
) -> CommerceResult<StatusCode>
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
{
    let use_case = RemoveCartItemUseCase::new(state.repo.clone());
    use_case
        .execute(&user.user_id, &CourseId::from_uuid(course_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Checkout
// ============================================================================

/// POST /api/orders
pub async fn create_order<R, G>(
    State(state): State<CommerceAppState<R, G>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateOrderRequest>,
) -> CommerceResult<(StatusCode, Json<CreateOrderResponse>)>
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
{
    let use_case = CheckoutUseCase::new(
        state.repo.clone(),
        state.gateway.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(CheckoutInput {
            user_id: user.user_id,
            payer_contact: user.phone.clone(),
            discount_code: req.discount_code,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            payment_url: output.payment_url,
            short_id: output.short_id,
            amount: output.amount,
        }),
    ))
}

/// GET /api/orders/verify?Authority=…
///
/// Gateway callback; unauthenticated, always a 302.
pub async fn verify_order<R, G>(
    State(state): State<CommerceAppState<R, G>>,
    Query(query): Query<VerifyQuery>,
) -> Redirect
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
{
    let Some(authority) = query.authority else {
        return Redirect::to(&state.config.failure_url);
    };

    let use_case = VerifyPaymentUseCase::new(state.repo.clone(), state.gateway.clone());

    match use_case.execute(&authority).await {
        // Settled or still pending: either way the buyer lands on the
        // order page, where the current state is visible.
        Ok(VerifyOutcome::Verified { short_id }) | Ok(VerifyOutcome::NotVerified { short_id }) => {
            Redirect::to(&state.config.order_url(short_id))
        }
        Ok(VerifyOutcome::Invalid) => Redirect::to(&state.config.failure_url),
        Err(err) => {
            // Outermost fallback: a browser mid-payment never sees a 500
            tracing::error!(error = %err, authority = %authority, "Verify callback failed");
            Redirect::to(&state.config.failure_url)
        }
    }
}

/// GET /api/orders/check/{short_id}
pub async fn get_order<R, G>(
    State(state): State<CommerceAppState<R, G>>,
    Extension(user): Extension<AuthUser>,
    Path(short_id): Path<i64>,
) -> CommerceResult<Json<OrderResponse>>
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
{
    let use_case = GetOrderUseCase::new(state.repo.clone());
    let order = use_case
        .execute(short_id, &user.user_id, user.is_admin())
        .await?;

    Ok(Json(OrderResponse::from(&order)))
}

// ============================================================================
// Grants
// ============================================================================

/// POST /api/courses/{course_id}/grants (admin)
pub async fn grant_course<R, G>(
    State(state): State<CommerceAppState<R, G>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<GrantCourseRequest>,
) -> CommerceResult<StatusCode>
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
{
    if !user.is_admin() {
        return Err(CommerceError::AdminOnly);
    }

    let use_case = GrantCourseUseCase::new(state.repo.clone());
    use_case
        .execute(
            &UserId::from_uuid(req.user_id),
            &CourseId::from_uuid(course_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
