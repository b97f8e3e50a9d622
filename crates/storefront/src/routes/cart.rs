//! Cart route handlers.
//!
//! The cart lives entirely in the signed `cart` cookie. Every mutation
//! reads it, applies the change and sends the re-signed cookie back.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use bazaar_core::ProductId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{Cart, wire};
use crate::routes::JsonBody;
use crate::services::cart::CartView;
use crate::state::AppState;

/// Body of an add or remove request. `product_id` may be a string or number.
#[derive(Debug, Default, Deserialize)]
pub struct CartMutation {
    #[serde(default, deserialize_with = "wire::optional_product_id")]
    pub product_id: Option<ProductId>,
}

impl CartMutation {
    fn require_product_id(self) -> Result<ProductId> {
        self.product_id
            .ok_or_else(|| AppError::Validation("Missing product_id".to_string()))
    }
}

/// Respond with the updated cart and its cookie.
fn cart_response(state: &AppState, cart: &Cart) -> Response {
    let cookie = state.cart_codec().cookie(cart);
    (
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(json!({ "response": true, "cart": cart })),
    )
        .into_response()
}

/// Raw cart entries.
///
/// GET /api/cart/get
pub async fn get(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let cart = state.cart_codec().read_cart(&headers);
    Json(json!({ "response": true, "cart": cart }))
}

/// Cart revalidated against the catalog.
///
/// GET /api/cart
pub async fn show(State(state): State<AppState>, headers: HeaderMap) -> Json<CartView> {
    let cart = state.cart_codec().read_cart(&headers);
    Json(CartView::build(&cart, state.catalog()))
}

/// Add one of a product.
///
/// POST /api/add/cart
#[instrument(skip(state, headers, body))]
pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<CartMutation>,
) -> Result<Response> {
    let product_id = body.require_product_id()?;
    let cart = state.cart_codec().read_cart(&headers).add(&product_id);

    add_breadcrumb("cart", "Added product", Some(&[("product_id", product_id.as_str())]));
    Ok(cart_response(&state, &cart))
}

/// Remove one of a product.
///
/// POST /api/remove/cart
#[instrument(skip(state, headers, body))]
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<CartMutation>,
) -> Result<Response> {
    let product_id = body.require_product_id()?;
    let cart = state.cart_codec().read_cart(&headers).remove(&product_id);

    add_breadcrumb("cart", "Removed product", Some(&[("product_id", product_id.as_str())]));
    Ok(cart_response(&state, &cart))
}
