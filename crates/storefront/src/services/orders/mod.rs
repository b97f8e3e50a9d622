//! Order lifecycle: checkout, payment verification, history.
//!
//! # Flow
//!
//! 1. `create_order` prices the cart from the catalog, registers the total
//!    with the payment gateway and stages the priced order under the
//!    gateway's order id.
//! 2. The client pays through the gateway and posts the resulting signature.
//! 3. `verify_payment` checks the signature, claims the staged order and
//!    commits it to the global order log and then to the user's history.
//!
//! The two commit writes are independent documents. If the second one fails
//! the log is ahead of the user record. The order goes back on the stage so
//! the client can retry the verification; the log write is skipped for an
//! order id it already holds. Orders that are never retried stay log-only
//! and are reported by `bazaar-cli reconcile`.

mod error;
pub mod eta;
pub mod pending;
pub mod pricing;

pub use error::{OrderError, PricingError};
pub use pending::PendingOrders;
pub use pricing::{CartLine, PricedCart, price_cart};

use serde::Serialize;
use tracing::instrument;

use bazaar_core::{OrderId, OrderStatus, PaymentId, UserId};

use crate::catalog::ProductDirectory;
use crate::db::{RepositoryError, Stores};
use crate::models::{CurrentUser, LineItem, OrderRecord, OrderView, ShippingAddress, StagedOrder};
use crate::payments::PaymentGateway;

/// Response to a successful order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedOrder {
    pub gateway_order_id: OrderId,
    /// Minor units, as registered with the gateway.
    pub amount: i64,
    pub currency: String,
}

/// Payment confirmation posted by the client after paying.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub signature: String,
}

/// Order service.
///
/// Borrows everything it needs from the application state for the duration
/// of one request.
pub struct OrderService<'a> {
    stores: &'a Stores,
    catalog: &'a dyn ProductDirectory,
    pending: &'a PendingOrders,
    gateway: &'a dyn PaymentGateway,
    currency: &'a str,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub fn new(
        stores: &'a Stores,
        catalog: &'a dyn ProductDirectory,
        pending: &'a PendingOrders,
        gateway: &'a dyn PaymentGateway,
        currency: &'a str,
    ) -> Self {
        Self {
            stores,
            catalog,
            pending,
            gateway,
            currency,
        }
    }

    /// Price a cart, create the gateway order and stage it.
    ///
    /// # Errors
    ///
    /// - `OrderError::Unauthorized` without an identity
    /// - `OrderError::Pricing` for an empty cart or invalid lines
    /// - `OrderError::Validation` when shipping fields are missing
    /// - `OrderError::Gateway` if the gateway call fails
    #[instrument(skip(self, user, lines, address), fields(user_id))]
    pub async fn create_order(
        &self,
        user: Option<&CurrentUser>,
        lines: &[CartLine],
        address: ShippingAddress,
    ) -> Result<CreatedOrder, OrderError> {
        let user = user.ok_or(OrderError::Unauthorized("login needed"))?;
        tracing::Span::current().record("user_id", user.id.as_str());

        if lines.is_empty() {
            return Err(PricingError::EmptyCart.into());
        }

        let missing = address.missing_fields();
        if !missing.is_empty() {
            return Err(OrderError::Validation(format!(
                "Missing user address fields: {}",
                missing.join(", ")
            )));
        }

        let priced = price_cart(lines, self.catalog)?;

        let gateway_order = self
            .gateway
            .create_order(priced.amount_minor, self.currency, true)
            .await?;

        self.pending
            .stage(
                gateway_order.id.clone(),
                StagedOrder {
                    items: priced.items,
                    subtotal: priced.subtotal,
                    tax: priced.tax,
                    grand_total: priced.grand_total,
                    shipping_address: address,
                },
            )
            .await?;

        tracing::info!(
            gateway_order_id = %gateway_order.id,
            amount = priced.amount_minor,
            "Order staged"
        );

        Ok(CreatedOrder {
            gateway_order_id: gateway_order.id,
            amount: priced.amount_minor,
            currency: self.currency.to_owned(),
        })
    }

    /// Verify a payment and commit its staged order.
    ///
    /// The signature is checked before the identity, and the global log is
    /// written before the user's history. Any failure after the order is
    /// claimed puts it back on the stage, so a retry can finish the commit.
    ///
    /// # Errors
    ///
    /// - `OrderError::NotFound` if nothing is staged under the order id, or
    ///   a concurrent verification claimed it first
    /// - `OrderError::VerificationFailed` on a bad signature
    /// - `OrderError::Unauthorized` without an identity, or for a user the
    ///   store doesn't know
    /// - `OrderError::Repository` if a commit write fails
    #[instrument(
        skip(self, user, confirmation),
        fields(order_id = %confirmation.order_id, payment_id = %confirmation.payment_id)
    )]
    pub async fn verify_payment(
        &self,
        user: Option<&CurrentUser>,
        confirmation: PaymentConfirmation,
    ) -> Result<OrderRecord, OrderError> {
        let PaymentConfirmation {
            payment_id,
            order_id,
            signature,
        } = confirmation;

        if self.pending.peek(&order_id).await.is_none() {
            return Err(OrderError::NotFound("Order not found"));
        }

        if self
            .gateway
            .verify_signature(&payment_id, &order_id, &signature)
            .is_err()
        {
            tracing::warn!("Payment signature rejected");
            return Err(OrderError::VerificationFailed);
        }

        let staged = self.pending.take(&order_id).await?;
        let record = OrderRecord::placed(
            order_id.clone(),
            payment_id,
            chrono::Local::now().naive_local(),
            staged.clone(),
        );

        let record = match self.stores.order_log().append(record).await {
            Ok(logged) => logged,
            Err(e) => {
                tracing::error!(error = %e, "Order log write failed, order re-staged");
                self.pending.restore(order_id, staged).await;
                return Err(e.into());
            }
        };

        let Some(user) = user else {
            tracing::error!("Payment logged without a session, order re-staged");
            self.pending.restore(order_id, staged).await;
            return Err(OrderError::Unauthorized("User not logged in"));
        };

        match self
            .stores
            .users()
            .append_order(&user.id, record.clone())
            .await
        {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => {
                tracing::error!(
                    user_id = %user.id,
                    "Payment logged for unknown user, order re-staged"
                );
                self.pending.restore(order_id, staged).await;
                return Err(OrderError::Unauthorized("User not found"));
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user.id,
                    error = %e,
                    "User history write failed after order log write, order re-staged"
                );
                self.pending.restore(order_id, staged).await;
                return Err(e.into());
            }
        }

        tracing::info!(
            user_id = %user.id,
            grand_total = %record.grand_total,
            "Order committed"
        );
        Ok(record)
    }

    /// A user's orders with delivery estimates.
    ///
    /// Cancelled orders are left out unless `show_cancelled` is set. An
    /// unknown user has no orders.
    pub async fn list_orders(&self, user_id: &UserId, show_cancelled: bool) -> Vec<OrderView> {
        self.stores
            .users()
            .orders(user_id)
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|o| show_cancelled || !o.status.is_cancelled())
            .map(|order| OrderView {
                delivery_eta: eta::format_delivery_eta(order.created_at),
                order,
            })
            .collect()
    }

    /// Cancel an order in the user's history.
    ///
    /// The global order log is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is not in the history.
    #[instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
    ) -> Result<OrderStatus, OrderError> {
        let status = self
            .stores
            .users()
            .cancel_order(user_id, order_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderError::NotFound("Order not found"),
                other => OrderError::Repository(other),
            })?;

        tracing::info!("Order cancelled");
        Ok(status)
    }

    /// Line items of a past order, for rebuilding a cart.
    ///
    /// Cancelled orders can be reordered. Prices are not revalidated here;
    /// the next checkout reprices everything.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is absent or has no items.
    pub async fn reorder(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
    ) -> Result<Vec<LineItem>, OrderError> {
        self.stores
            .users()
            .find_order(user_id, order_id)
            .await
            .map(|o| o.items)
            .filter(|items| !items.is_empty())
            .ok_or(OrderError::NotFound("Order not found"))
    }
}
