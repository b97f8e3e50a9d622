//! Signed cart cookie.
//!
//! The cart token is `base64url(JSON entries) + "." + hex(HMAC-SHA256)`,
//! keyed by the session secret. Anything that fails to decode or verify is
//! treated as an empty cart.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

use bazaar_core::{Amount, ProductId};

use crate::catalog::ProductDirectory;
use crate::models::{Cart, CartEntry};
use crate::payments::signature::constant_time_compare;

type HmacSha256 = Hmac<Sha256>;

/// Cart cookie name.
pub const CART_COOKIE: &str = "cart";

/// Cart cookie lifetime.
pub const CART_MAX_AGE_DAYS: i64 = 7;

/// Error building a [`CartCodec`].
#[derive(Debug, thiserror::Error)]
#[error("invalid cart signing key")]
pub struct InvalidCartKey;

/// Encodes and decodes signed cart tokens.
#[derive(Clone)]
pub struct CartCodec {
    mac: HmacSha256,
}

impl CartCodec {
    /// Create a codec keyed by `secret`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCartKey` if the key is rejected by the MAC.
    pub fn new(secret: &SecretString) -> Result<Self, InvalidCartKey> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| InvalidCartKey)?;
        Ok(Self { mac })
    }

    fn tag(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Encode a cart as a signed token.
    #[must_use]
    pub fn encode(&self, cart: &Cart) -> String {
        // Serializing a Vec of plain structs cannot fail.
        let json = serde_json::to_vec(cart).unwrap_or_else(|_| b"[]".to_vec());
        let payload = URL_SAFE_NO_PAD.encode(json);
        let tag = self.tag(&payload);
        format!("{payload}.{tag}")
    }

    /// Decode a signed token, falling back to an empty cart.
    #[must_use]
    pub fn decode(&self, token: &str) -> Cart {
        self.try_decode(token).unwrap_or_default()
    }

    fn try_decode(&self, token: &str) -> Option<Cart> {
        let (payload, tag) = token.split_once('.')?;
        if !constant_time_compare(&self.tag(payload), tag) {
            return None;
        }
        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let entries: Vec<CartEntry> = serde_json::from_slice(&json).ok()?;
        Cart::from_entries(entries)
    }

    /// Read the cart from a request's `Cookie` headers.
    #[must_use]
    pub fn read_cart(&self, headers: &HeaderMap) -> Cart {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == CART_COOKIE)
            .map(|cookie| self.decode(cookie.value()))
            .unwrap_or_default()
    }

    /// Build the `Set-Cookie` value carrying `cart`.
    #[must_use]
    pub fn cookie(&self, cart: &Cart) -> Cookie<'static> {
        Cookie::build((CART_COOKIE, self.encode(cart)))
            .path("/")
            .max_age(Duration::days(CART_MAX_AGE_DAYS))
            .same_site(SameSite::Lax)
            .http_only(true)
            .build()
    }
}

/// One revalidated cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartViewLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub qty: u32,
    pub unit_price: Amount,
    pub line_total: Amount,
}

/// Cart joined with the catalog for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartViewLine>,
    pub subtotal: Amount,
    pub item_count: u32,
}

impl CartView {
    /// Join `cart` with the catalog, dropping products it doesn't list.
    #[must_use]
    pub fn build(cart: &Cart, catalog: &dyn ProductDirectory) -> Self {
        let mut view = Self::default();
        for entry in cart.entries() {
            let Some(product) = catalog.get(&entry.product_id) else {
                continue;
            };
            let Some(line_total) = product.price.checked_mul_qty(entry.qty) else {
                continue;
            };
            let Some(subtotal) = view.subtotal.checked_add(line_total) else {
                continue;
            };

            view.subtotal = subtotal;
            view.item_count = view.item_count.saturating_add(entry.qty);
            view.items.push(CartViewLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                image: product.clone().with_static_image().image,
                qty: entry.qty,
                unit_price: product.price,
                line_total,
            });
        }
        view
    }
}
