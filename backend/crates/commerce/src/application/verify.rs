//! Verify Payment Use Case
//!
//! The gateway callback path. Invoked out-of-band when the gateway
//! redirects the buyer back; the caller is a browser, so the handler
//! above this use case translates every outcome — including errors —
//! into a redirect.
//!
//! Idempotence: the grant insert skips existing (user, course) pairs,
//! clearing an empty cart is a no-op, and the status flip only applies
//! to a PAYING order. A crash between any of those steps leaves a
//! retry of the same authority safe.

use std::sync::Arc;

use crate::domain::entity::course_access::GrantSource;
use crate::domain::gateway::PaymentGateway;
use crate::domain::repository::{CartRepository, CourseAccessRepository, OrderRepository};
use crate::error::CommerceResult;

/// Outcome of a callback verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// No PAYING order for this authority: stale, forged or replayed
    Invalid,
    /// Gateway reports the payment as not settled; nothing was mutated
    NotVerified { short_id: i64 },
    /// Payment confirmed; access granted, cart cleared, order flipped
    Verified { short_id: i64 },
}

/// Verify payment use case
pub struct VerifyPaymentUseCase<R, G>
where
    R: OrderRepository + CartRepository + CourseAccessRepository + Clone + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    repo: Arc<R>,
    gateway: Arc<G>,
}

impl<R, G> VerifyPaymentUseCase<R, G>
where
    R: OrderRepository + CartRepository + CourseAccessRepository + Clone + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, gateway: Arc<G>) -> Self {
        Self { repo, gateway }
    }

    pub async fn execute(&self, authority: &str) -> CommerceResult<VerifyOutcome> {
        let order = match self.repo.find_paying_by_authority(authority).await? {
            Some(order) => order,
            None => {
                tracing::warn!(authority, "Callback without a matching PAYING order");
                return Ok(VerifyOutcome::Invalid);
            }
        };

        // Verification is bound to the original amount
        let verified = self.gateway.verify_payment(authority, order.amount).await?;

        if !verified {
            tracing::warn!(
                short_id = order.short_id,
                authority,
                "Gateway reports payment not verified"
            );
            return Ok(VerifyOutcome::NotVerified {
                short_id: order.short_id,
            });
        }

        let granted = self
            .repo
            .grant_courses(&order.user_id, &order.items, GrantSource::Order)
            .await?;
        self.repo.clear_cart(&order.user_id).await?;
        self.repo.mark_successful(&order.order_id).await?;

        tracing::info!(
            short_id = order.short_id,
            authority,
            courses_granted = granted,
            "Order settled"
        );

        Ok(VerifyOutcome::Verified {
            short_id: order.short_id,
        })
    }
}
