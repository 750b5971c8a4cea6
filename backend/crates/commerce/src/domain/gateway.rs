//! Payment Gateway Contract
//!
//! The gateway is an external collaborator; this trait is the exact
//! surface the orchestrator depends on. Transport failures, timeouts
//! and non-success responses all surface as `GatewayUnavailable`, never
//! as an ambiguous success.

use crate::error::CommerceResult;

/// Payment intent request
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// Amount in the integer currency unit
    pub amount: i64,
    /// Human-readable description shown on the gateway page
    pub description: String,
    /// Buyer contact (phone) forwarded to the gateway
    pub payer_contact: String,
}

/// Open payment intent
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    /// Gateway correlation id for this attempt
    pub authority: String,
    /// Where to send the buyer's browser
    pub redirect_url: String,
}

/// Payment gateway adapter
#[trait_variant::make(PaymentGateway: Send)]
pub trait LocalPaymentGateway {
    /// Open a payment intent for `request.amount`
    async fn create_payment(&self, request: &PaymentRequest) -> CommerceResult<PaymentIntent>;

    /// Verify a payment by authority
    ///
    /// The amount must be the one used at creation; the gateway binds
    /// verification to it, which prevents tampering with the authority
    /// alone.
    async fn verify_payment(&self, authority: &str, amount: i64) -> CommerceResult<bool>;
}
