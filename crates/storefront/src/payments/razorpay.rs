//! Razorpay Orders API client.
//!
//! - Base URL: `RAZORPAY_API_BASE` (default `https://api.razorpay.com`)
//! - Authentication: HTTP basic auth with key id and key secret
//! - Endpoint: `POST /v1/orders`

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use bazaar_core::{OrderId, PaymentId};

use super::{GatewayError, GatewayOrder, PaymentGateway, signature};
use crate::config::RazorpayConfig;

/// Razorpay API client.
#[derive(Clone)]
pub struct RazorpayClient {
    inner: Arc<RazorpayClientInner>,
}

struct RazorpayClientInner {
    client: reqwest::Client,
    orders_url: String,
    key_id: String,
    key_secret: SecretString,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    payment_capture: u8,
    receipt: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl RazorpayClient {
    /// Create a new Razorpay client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the HTTP client fails to build.
    pub fn new(config: &RazorpayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RazorpayClientInner {
                client,
                orders_url: format!("{}/v1/orders", config.api_base),
                key_id: config.key_id.clone(),
                key_secret: config.key_secret.clone(),
            }),
        })
    }

    /// Convert a non-success response into a `GatewayError::Api`.
    async fn parse_error(response: reqwest::Response) -> GatewayError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorEnvelope>(&body).map_or_else(
            |_| body.chars().take(200).collect(),
            |envelope| {
                let code = envelope.error.code.unwrap_or_default();
                let description = envelope.error.description.unwrap_or_default();
                format!("{code}: {description}")
            },
        );

        GatewayError::Api { status, message }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(skip(self))]
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        auto_capture: bool,
    ) -> Result<GatewayOrder, GatewayError> {
        let body = CreateOrderRequest {
            amount: amount_minor,
            currency,
            payment_capture: u8::from(auto_capture),
            receipt: Uuid::new_v4().simple().to_string(),
        };

        let response = self
            .inner
            .client
            .post(&self.inner.orders_url)
            .basic_auth(
                &self.inner.key_id,
                Some(self.inner.key_secret.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let order: GatewayOrder = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(format!("Failed to parse order response: {e}")))?;

        tracing::debug!(gateway_order_id = %order.id, "Gateway order created");
        Ok(order)
    }

    fn verify_signature(
        &self,
        payment_id: &PaymentId,
        order_id: &OrderId,
        signature: &str,
    ) -> Result<(), GatewayError> {
        signature::verify(
            order_id,
            payment_id,
            signature,
            self.inner.key_secret.expose_secret(),
        )
    }
}
