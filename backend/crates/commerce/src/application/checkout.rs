//! Checkout Use Case
//!
//! Turns a priced cart into a PAYING order with an open payment intent.
//!
//! Ordering of effects:
//! 1. redeem the discount code (single conditional increment; a
//!    rejected attempt consumes nothing)
//! 2. load and price the cart
//! 3. allocate the human-facing order id
//! 4. open the payment intent at the gateway
//! 5. persist the order with the cart snapshot and the authority
//!
//! Any failure after step 1 releases the redemption slot. A gateway
//! failure keeps the allocated short id (gaps are harmless); a failed
//! order insert hands the sequence slot back.

use std::sync::Arc;

use auth::domain::value_object::user_id::UserId;
use chrono::Utc;

use crate::application::config::CommerceConfig;
use crate::domain::entity::course_access::GrantSource;
use crate::domain::entity::discount::Discount;
use crate::domain::entity::order::{Order, OrderStatus};
use crate::domain::gateway::{PaymentGateway, PaymentRequest};
use crate::domain::repository::{
    CartRepository, CounterKind, CourseAccessRepository, CourseRepository, DiscountRepository,
    OrderRepository, RedeemOutcome, ShortIdAllocator,
};
use crate::domain::services::{code_discount_amount, price_courses};
use crate::error::{CommerceError, CommerceResult};

/// Checkout input
pub struct CheckoutInput {
    pub user_id: UserId,
    /// Buyer contact forwarded to the gateway
    pub payer_contact: String,
    pub discount_code: Option<String>,
}

/// Checkout output
#[derive(Debug)]
pub struct CheckoutOutput {
    pub short_id: i64,
    /// Final payable amount
    pub amount: i64,
    /// Gateway redirect URL; `None` when the order settled at zero
    pub payment_url: Option<String>,
}

/// Checkout use case
pub struct CheckoutUseCase<R, G>
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
    repo: Arc<R>,
    gateway: Arc<G>,
    config: Arc<CommerceConfig>,
}

impl<R, G> CheckoutUseCase<R, G>
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
    pub fn new(repo: Arc<R>, gateway: Arc<G>, config: Arc<CommerceConfig>) -> Self {
        Self {
            repo,
            gateway,
            config,
        }
    }

    pub async fn execute(&self, input: CheckoutInput) -> CommerceResult<CheckoutOutput> {
        let redeemed = match &input.discount_code {
            Some(code) => match self.repo.redeem(code).await? {
                RedeemOutcome::Redeemed(discount) => Some(discount),
                RedeemOutcome::NotFound => return Err(CommerceError::DiscountNotFound),
                RedeemOutcome::Exhausted => return Err(CommerceError::DiscountExhausted),
                RedeemOutcome::Expired => return Err(CommerceError::DiscountExpired),
            },
            None => None,
        };

        match self.checkout_redeemed(&input, redeemed.as_ref()).await {
            Ok(output) => Ok(output),
            Err(err) => {
                // Compensate: the slot was reserved but the checkout died
                if let Some(discount) = &redeemed {
                    if let Err(release_err) = self.repo.release(&discount.code).await {
                        tracing::error!(
                            code = %discount.code,
                            error = %release_err,
                            "Failed to release discount redemption slot"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    async fn checkout_redeemed(
        &self,
        input: &CheckoutInput,
        discount: Option<&Discount>,
    ) -> CommerceResult<CheckoutOutput> {
        let cart = self
            .repo
            .find_cart(&input.user_id)
            .await?
            .ok_or(CommerceError::CartNotFound)?;

        if cart.is_empty() {
            return Err(CommerceError::CartEmpty);
        }

        let courses = self.repo.find_courses(&cart.items).await?;
        if courses.len() != cart.items.len() {
            // The cart references a course that no longer exists
            return Err(CommerceError::CourseNotFound);
        }

        let pricing = price_courses(&courses);
        let mut payable = pricing.payable_amount;

        if let Some(discount) = discount {
            let off = code_discount_amount(&courses, &pricing, discount)
                .ok_or(CommerceError::DiscountNotApplicable)?;
            payable -= off;
        }

        let short_id = self.repo.allocate(CounterKind::Orders).await?;

        // A fully discounted cart settles without a gateway round-trip
        if payable == 0 {
            return self.settle_free(input, &cart.items, short_id, discount).await;
        }

        let intent = self
            .gateway
            .create_payment(&PaymentRequest {
                amount: payable,
                description: self.config.order_description.clone(),
                payer_contact: input.payer_contact.clone(),
            })
            .await?;

        let order = Order::new(
            short_id,
            input.user_id,
            cart.items.clone(),
            payable,
            intent.authority.clone(),
            discount.map(|d| d.code.clone()),
        );

        if let Err(err) = self.repo.create_order(&order).await {
            // The id was drawn but never persisted to an entity
            if let Err(rollback_err) = self.repo.rollback(CounterKind::Orders).await {
                tracing::error!(error = %rollback_err, "Failed to roll back order short-id");
            }
            return Err(err);
        }

        tracing::info!(
            short_id,
            amount = payable,
            authority = %intent.authority,
            "Order created, awaiting payment"
        );

        Ok(CheckoutOutput {
            short_id,
            amount: payable,
            payment_url: Some(intent.redirect_url),
        })
    }

    async fn settle_free(
        &self,
        input: &CheckoutInput,
        items: &[kernel::id::CourseId],
        short_id: i64,
        discount: Option<&Discount>,
    ) -> CommerceResult<CheckoutOutput> {
        let mut order = Order::new(
            short_id,
            input.user_id,
            items.to_vec(),
            0,
            String::new(),
            discount.map(|d| d.code.clone()),
        );
        order.status = OrderStatus::Successful;
        order.paid_at = Some(Utc::now());

        self.repo.create_order(&order).await?;
        self.repo
            .grant_courses(&input.user_id, items, GrantSource::Order)
            .await?;
        self.repo.clear_cart(&input.user_id).await?;

        tracing::info!(short_id, "Zero-amount order settled immediately");

        Ok(CheckoutOutput {
            short_id,
            amount: 0,
            payment_url: None,
        })
    }
}
