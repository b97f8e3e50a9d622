//! Server-side order pricing.
//!
//! Every amount is recomputed from the catalog. Prices or totals the client
//! sends along with its cart are ignored.

use serde::Deserialize;

use bazaar_core::{Amount, ProductId, TAX_RATE};

use super::PricingError;
use crate::catalog::ProductDirectory;
use crate::models::{LineItem, wire};

/// A cart line as submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLine {
    #[serde(default, deserialize_with = "wire::optional_product_id")]
    pub product_id: Option<ProductId>,
    #[serde(default, deserialize_with = "wire::lenient_qty")]
    pub qty: i64,
}

/// A fully priced cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub items: Vec<LineItem>,
    pub subtotal: Amount,
    pub tax: Amount,
    pub grand_total: Amount,
    /// `grand_total` in gateway minor units.
    pub amount_minor: i64,
}

/// Price a cart against the catalog.
///
/// # Errors
///
/// - `PricingError::EmptyCart` if there are no lines
/// - `PricingError::InvalidProduct` for a missing or unknown product id, or a
///   quantity below 1
/// - `PricingError::Overflow` if any total does not fit
pub fn price_cart(
    lines: &[CartLine],
    catalog: &dyn ProductDirectory,
) -> Result<PricedCart, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let mut items = Vec::with_capacity(lines.len());
    let mut subtotal = Amount::ZERO;

    for line in lines {
        let product = line
            .product_id
            .as_ref()
            .and_then(|id| catalog.get(id))
            .ok_or(PricingError::InvalidProduct)?;

        if line.qty <= 0 {
            return Err(PricingError::InvalidProduct);
        }
        let qty = u32::try_from(line.qty).map_err(|_| PricingError::Overflow)?;

        let total = product
            .price
            .checked_mul_qty(qty)
            .ok_or(PricingError::Overflow)?;
        subtotal = subtotal.checked_add(total).ok_or(PricingError::Overflow)?;

        items.push(LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            qty,
            total,
        });
    }

    let tax = subtotal.tax_at(TAX_RATE).ok_or(PricingError::Overflow)?;
    let grand_total = subtotal.checked_add(tax).ok_or(PricingError::Overflow)?;
    let amount_minor = grand_total
        .to_minor_units()
        .ok_or(PricingError::Overflow)?;

    Ok(PricedCart {
        items,
        subtotal,
        tax,
        grand_total,
        amount_minor,
    })
}
