//! Client-held shopping cart.
//!
//! The cart lives in a signed cookie and is never trusted for pricing. Adding
//! and removing are pure functions over [`Cart`]; encoding happens at the
//! HTTP boundary (see `services::cart`).

use serde::{Deserialize, Serialize};

use bazaar_core::ProductId;

/// One product in the cart. `qty` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub qty: u32,
}

/// Ordered cart entries, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(Vec<CartEntry>);

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a cart from decoded entries, rejecting ones that break the
    /// cart's invariants (zero quantity, duplicate product).
    #[must_use]
    pub fn from_entries(entries: Vec<CartEntry>) -> Option<Self> {
        let mut seen = std::collections::HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.qty == 0 || entry.product_id.is_blank() || !seen.insert(&entry.product_id) {
                return None;
            }
        }
        Some(Self(entries))
    }

    /// Increment `product_id`, appending it with quantity 1 if absent.
    #[must_use]
    pub fn add(mut self, product_id: &ProductId) -> Self {
        match self.0.iter_mut().find(|e| &e.product_id == product_id) {
            Some(entry) => entry.qty = entry.qty.saturating_add(1),
            None => self.0.push(CartEntry {
                product_id: product_id.clone(),
                qty: 1,
            }),
        }
        self
    }

    /// Decrement `product_id`, dropping the entry when it would reach zero.
    ///
    /// Removing a product that is not in the cart is a no-op.
    #[must_use]
    pub fn remove(mut self, product_id: &ProductId) -> Self {
        if let Some(index) = self.0.iter().position(|e| &e.product_id == product_id) {
            if let Some(entry) = self.0.get_mut(index)
                && entry.qty > 1
            {
                entry.qty -= 1;
            } else {
                self.0.remove(index);
            }
        }
        self
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.0
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Quantity of `product_id`, zero if absent.
    #[must_use]
    pub fn qty(&self, product_id: &ProductId) -> u32 {
        self.0
            .iter()
            .find(|e| &e.product_id == product_id)
            .map_or(0, |e| e.qty)
    }
}
