//! Payment gateway integration.
//!
//! # Contract
//!
//! - `create_order` registers an amount (in minor units) with the gateway and
//!   returns its order id. The client then pays against that id.
//! - `verify_signature` checks the signature the gateway hands the client
//!   after payment: hex HMAC-SHA256 of `order_id|payment_id` keyed by the
//!   merchant key secret.
//!
//! Order creation is not idempotent, so calls fail fast and are never retried.
//!
//! # Implementations
//!
//! - [`RazorpayClient`] - Razorpay Orders API over HTTPS

mod razorpay;
pub mod signature;

pub use razorpay::RazorpayClient;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use bazaar_core::{OrderId, PaymentId};

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed (including timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a gateway response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Payment signature did not verify.
    #[error("payment signature mismatch")]
    InvalidSignature,
}

/// An order created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id (`order_...`).
    pub id: OrderId,
}

/// Payment gateway operations used by checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a gateway order for `amount_minor` units of `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the gateway is unreachable or rejects
    /// the request.
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        auto_capture: bool,
    ) -> Result<GatewayOrder, GatewayError>;

    /// Verify the signature returned to the client after payment.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidSignature` on any mismatch.
    fn verify_signature(
        &self,
        payment_id: &PaymentId,
        order_id: &OrderId,
        signature: &str,
    ) -> Result<(), GatewayError>;
}
