//! Order Entity
//!
//! An order snapshots the cart at purchase time; it never references the
//! live cart. Created in PAYING state before the gateway redirect and
//! flipped to SUCCESSFUL only after the gateway confirms the payment.

use auth::domain::value_object::user_id::UserId;
use chrono::{DateTime, Utc};
use kernel::id::{CourseId, OrderId};

/// Order state machine
///
/// `Paying -> Successful` on verified payment; `Paying -> Failed` when
/// the housekeeping job gives up on a stale order. Both ends are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum OrderStatus {
    Paying = 0,
    Successful = 1,
    Failed = 2,
}

impl OrderStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            OrderStatus::Paying => "paying",
            OrderStatus::Successful => "successful",
            OrderStatus::Failed => "failed",
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Self {
        match id {
            0 => OrderStatus::Paying,
            1 => OrderStatus::Successful,
            2 => OrderStatus::Failed,
            _ => {
                tracing::error!("Invalid OrderStatus id: {}", id);
                unreachable!("Invalid OrderStatus id: {}", id)
            }
        }
    }
}

/// Order entity
#[derive(Debug, Clone)]
pub struct Order {
    /// Internal UUID identifier
    pub order_id: OrderId,
    /// Human-facing short identifier
    pub short_id: i64,
    /// Buyer
    pub user_id: UserId,
    /// Snapshot of cart items at purchase time
    pub items: Vec<CourseId>,
    /// Final payable amount in the integer currency unit
    pub amount: i64,
    /// State machine position
    pub status: OrderStatus,
    /// Gateway correlation id for this payment attempt
    pub authority: String,
    /// Discount code applied at checkout, if any
    pub discount_code: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Moment the payment was confirmed
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a new order in PAYING state
    pub fn new(
        short_id: i64,
        user_id: UserId,
        items: Vec<CourseId>,
        amount: i64,
        authority: String,
        discount_code: Option<String>,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            short_id,
            user_id,
            items,
            amount,
            status: OrderStatus::Paying,
            authority,
            discount_code,
            created_at: Utc::now(),
            paid_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ids_roundtrip() {
        for status in [OrderStatus::Paying, OrderStatus::Successful, OrderStatus::Failed] {
            assert_eq!(OrderStatus::from_id(status.id()), status);
        }
    }

    #[test]
    fn test_new_order_is_paying() {
        let order = Order::new(
            42,
            UserId::new(),
            vec![CourseId::new()],
            810,
            "A00001".to_string(),
            Some("SAVE10".to_string()),
        );
        assert_eq!(order.status, OrderStatus::Paying);
        assert!(order.paid_at.is_none());
    }
}
