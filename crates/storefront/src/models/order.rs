//! Order types: staged (awaiting payment) and committed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use bazaar_core::{Amount, OrderId, OrderStatus, PaymentId, ProductId};

use super::wire::lenient_string;

/// A priced line, computed from the catalog at order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price from the catalog.
    pub price: Amount,
    pub qty: u32,
    /// `price * qty`.
    pub total: Amount,
}

/// Where an order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pincode: String,
}

impl ShippingAddress {
    /// Names of required fields that are empty or whitespace.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("pincode", &self.pincode),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Order detail held between gateway order creation and payment verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedOrder {
    pub items: Vec<LineItem>,
    pub subtotal: Amount,
    pub tax: Amount,
    pub grand_total: Amount,
    pub shipping_address: ShippingAddress,
}

/// A committed order, as stored in the order log and in user histories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Gateway order id.
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    #[serde(with = "created_at_format", alias = "timestamp")]
    pub created_at: NaiveDateTime,
    pub items: Vec<LineItem>,
    pub subtotal: Amount,
    #[serde(alias = "gst")]
    pub tax: Amount,
    pub grand_total: Amount,
    #[serde(alias = "user_location")]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub status: OrderStatus,
}

impl OrderRecord {
    /// Build a freshly placed order from its staged detail.
    #[must_use]
    pub fn placed(
        order_id: OrderId,
        payment_id: PaymentId,
        created_at: NaiveDateTime,
        staged: StagedOrder,
    ) -> Self {
        Self {
            order_id,
            payment_id,
            created_at,
            items: staged.items,
            subtotal: staged.subtotal,
            tax: staged.tax,
            grand_total: staged.grand_total,
            shipping_address: staged.shipping_address,
            status: OrderStatus::Placed,
        }
    }
}

/// An order as returned by the history API, with its derived delivery date.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: OrderRecord,
    /// `YYYY-MM-DD`.
    pub delivery_eta: String,
}

/// `created_at` is wall-clock local time as `YYYY-MM-DD HH:MM:SS`.
pub mod created_at_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    /// # Errors
    ///
    /// Fails when the string is not in `FORMAT`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
