//! HTTP Payment Gateway
//!
//! Reqwest-based implementation of the gateway contract. Every
//! transport problem — connect failure, timeout, non-success status,
//! malformed body — maps to `GatewayUnavailable`; a verification is
//! only ever `true` on an explicit confirmation from the gateway.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::gateway::{PaymentGateway, PaymentIntent, PaymentRequest};
use crate::error::{CommerceError, CommerceResult};

/// Gateway connection configuration
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Gateway API base URL
    pub base_url: String,
    /// Merchant identifier issued by the gateway
    pub merchant_id: String,
    /// Absolute URL the gateway redirects the buyer back to
    pub callback_url: String,
    /// Hard timeout per gateway call; the gateway's API can hang
    pub timeout: Duration,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gateway.example.com/api/v1".to_string(),
            merchant_id: String::new(),
            callback_url: "http://localhost:8080/api/orders/verify".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP payment gateway adapter
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: HttpGatewayConfig,
}

impl HttpPaymentGateway {
    pub fn new(config: HttpGatewayConfig) -> CommerceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CommerceError::Internal(format!("HTTP client build failed: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct CreateRequestBody<'a> {
    merchant_id: &'a str,
    amount: i64,
    description: &'a str,
    callback_url: &'a str,
    mobile: &'a str,
}

#[derive(Deserialize)]
struct CreateResponseBody {
    authority: String,
    payment_url: String,
}

#[derive(Serialize)]
struct VerifyRequestBody<'a> {
    merchant_id: &'a str,
    authority: &'a str,
    amount: i64,
}

#[derive(Deserialize)]
struct VerifyResponseBody {
    verified: bool,
}

fn transport_err(context: &str, err: reqwest::Error) -> CommerceError {
    if err.is_timeout() {
        CommerceError::GatewayUnavailable(format!("{context}: timed out"))
    } else {
        CommerceError::GatewayUnavailable(format!("{context}: {err}"))
    }
}

impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment(&self, request: &PaymentRequest) -> CommerceResult<PaymentIntent> {
        let response = self
            .client
            .post(self.endpoint("payment/request"))
            .json(&CreateRequestBody {
                merchant_id: &self.config.merchant_id,
                amount: request.amount,
                description: &request.description,
                callback_url: &self.config.callback_url,
                mobile: &request.payer_contact,
            })
            .send()
            .await
            .map_err(|e| transport_err("create payment", e))?;

        if !response.status().is_success() {
            return Err(CommerceError::GatewayUnavailable(format!(
                "create payment: gateway returned {}",
                response.status()
            )));
        }

        let body: CreateResponseBody = response
            .json()
            .await
            .map_err(|e| transport_err("create payment body", e))?;

        Ok(PaymentIntent {
            authority: body.authority,
            redirect_url: body.payment_url,
        })
    }

    async fn verify_payment(&self, authority: &str, amount: i64) -> CommerceResult<bool> {
        let response = self
            .client
            .post(self.endpoint("payment/verify"))
            .json(&VerifyRequestBody {
                merchant_id: &self.config.merchant_id,
                authority,
                amount,
            })
            .send()
            .await
            .map_err(|e| transport_err("verify payment", e))?;

        if !response.status().is_success() {
            return Err(CommerceError::GatewayUnavailable(format!(
                "verify payment: gateway returned {}",
                response.status()
            )));
        }

        let body: VerifyResponseBody = response
            .json()
            .await
            .map_err(|e| transport_err("verify payment body", e))?;

        Ok(body.verified)
    }
}
