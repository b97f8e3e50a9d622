//! Checkout route handlers.
//!
//! `create-order` registers the server-priced total with the gateway and
//! hands the client what the checkout widget needs. `verify-payment` takes
//! the widget's callback payload.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use bazaar_core::{OrderId, PaymentId};

use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::ShippingAddress;
use crate::routes::JsonBody;
use crate::services::orders::{CartLine, PaymentConfirmation};
use crate::state::AppState;

/// Body of `POST /create-order`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    pub cart: Vec<CartLine>,
    #[serde(alias = "shipping_address")]
    pub user_location: ShippingAddress,
}

/// Body of `POST /verify-payment`.
///
/// Accepts both our field names and the checkout widget's `razorpay_*` ones.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyPaymentRequest {
    #[serde(alias = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    #[serde(alias = "razorpay_order_id")]
    pub gateway_order_id: Option<String>,
    #[serde(alias = "razorpay_signature")]
    pub signature: Option<String>,
}

impl VerifyPaymentRequest {
    fn into_confirmation(self) -> Result<PaymentConfirmation> {
        match (self.payment_id, self.gateway_order_id, self.signature) {
            (Some(payment_id), Some(order_id), Some(signature))
                if !payment_id.is_empty() && !order_id.is_empty() && !signature.is_empty() =>
            {
                Ok(PaymentConfirmation {
                    payment_id: PaymentId::new(payment_id),
                    order_id: OrderId::new(order_id),
                    signature,
                })
            }
            _ => Err(AppError::Validation("Missing fields".to_string())),
        }
    }
}

/// Price the cart and create a gateway order.
///
/// POST /create-order
#[instrument(skip(state, user, body))]
pub async fn create_order(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    JsonBody(body): JsonBody<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    let created = state
        .orders()
        .create_order(user.as_ref(), &body.cart, body.user_location)
        .await?;

    Ok(Json(json!({
        "id": created.gateway_order_id,
        "gateway_order_id": created.gateway_order_id,
        "amount": created.amount,
        "currency": created.currency,
        "key_id": state.config().razorpay.key_id,
    })))
}

/// Verify a payment and commit its order.
///
/// POST /verify-payment
#[instrument(skip(state, user, body))]
pub async fn verify_payment(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    JsonBody(body): JsonBody<VerifyPaymentRequest>,
) -> Result<impl IntoResponse> {
    let confirmation = body.into_confirmation()?;
    let record = state
        .orders()
        .verify_payment(user.as_ref(), confirmation)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "order_id": record.order_id,
    })))
}
