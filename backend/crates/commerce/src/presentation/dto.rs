//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::order::Order;

// ============================================================================
// Cart
// ============================================================================

/// Add-to-cart request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub course_id: Uuid,
}

/// Add-to-cart response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemResponse {
    /// Course was appended to the cart
    pub added: bool,
    /// Free course: access granted directly, cart untouched
    pub granted: bool,
}

// ============================================================================
// Checkout
// ============================================================================

/// Checkout request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub discount_code: Option<String>,
}

/// Checkout response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Where to redirect the buyer; absent when the order settled at zero
    pub payment_url: Option<String>,
    pub short_id: i64,
    pub amount: i64,
}

/// Gateway callback query string
///
/// The gateway controls this shape; `Authority` is capitalized on the
/// wire. The field is optional so that a malformed callback still ends
/// in a redirect instead of a rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "Authority")]
    pub authority: Option<String>,
}

// ============================================================================
// Orders
// ============================================================================

/// Order detail response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub short_id: i64,
    pub items: Vec<Uuid>,
    pub amount: i64,
    pub status: String,
    pub created_at_ms: i64,
    pub paid_at_ms: Option<i64>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            short_id: order.short_id,
            items: order.items.iter().map(|id| *id.as_uuid()).collect(),
            amount: order.amount,
            status: order.status.code().to_string(),
            created_at_ms: order.created_at.timestamp_millis(),
            paid_at_ms: order.paid_at.map(|at| at.timestamp_millis()),
        }
    }
}

// ============================================================================
// Grants
// ============================================================================

/// Administrative grant request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantCourseRequest {
    pub user_id: Uuid,
}
