//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use bazaar_core::ProductId;

use crate::catalog::Product;
use crate::state::AppState;

/// List the catalog.
///
/// GET /api/products
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let products: Vec<Product> = state
        .catalog()
        .list()
        .iter()
        .cloned()
        .map(Product::with_static_image)
        .collect();

    Json(json!({ "response": true, "products": products }))
}

/// Single product with its image path rooted under `/static/`.
///
/// GET /api/product/{id}
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.catalog().get(&ProductId::new(id)) {
        Some(product) => Json(json!({
            "response": true,
            "product": product.clone().with_static_image(),
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "response": false, "error": "Product not found" })),
        )
            .into_response(),
    }
}
