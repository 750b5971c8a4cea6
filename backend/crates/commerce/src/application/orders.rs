//! Get Order Use Case
//!
//! Owner-only order inspection; admins may read any order.

use std::sync::Arc;

use auth::domain::value_object::user_id::UserId;

use crate::domain::entity::order::Order;
use crate::domain::repository::OrderRepository;
use crate::error::{CommerceError, CommerceResult};

/// Get order use case
pub struct GetOrderUseCase<R>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> GetOrderUseCase<R>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        short_id: i64,
        requester: &UserId,
        requester_is_admin: bool,
    ) -> CommerceResult<Order> {
        let order = self
            .repo
            .find_by_short_id(short_id)
            .await?
            .ok_or(CommerceError::OrderNotFound)?;

        if order.user_id != *requester && !requester_is_admin {
            return Err(CommerceError::ForeignOrder);
        }

        Ok(order)
    }
}
