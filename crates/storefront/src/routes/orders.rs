//! Order history route handlers.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use bazaar_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::routes::JsonBody;
use crate::state::AppState;

/// Query for `GET /api/get-orders`. Only `show_cancelled=1` includes them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrdersQuery {
    pub show_cancelled: Option<String>,
}

/// Body naming one order in the caller's history.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderRef {
    pub order_id: Option<OrderId>,
}

impl OrderRef {
    fn require(self) -> Result<OrderId> {
        self.order_id
            .filter(|id| !id.is_blank())
            .ok_or_else(|| AppError::Validation("Missing order_id".to_string()))
    }
}

/// The caller's orders with delivery estimates.
///
/// GET /api/get-orders?show_cancelled=0|1
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> impl IntoResponse {
    let show_cancelled = query.show_cancelled.as_deref() == Some("1");
    let orders = state.orders().list_orders(&user.id, show_cancelled).await;
    Json(json!({ "orders": orders }))
}

/// Cancel an order.
///
/// POST /api/cancel-order
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<OrderRef>,
) -> Result<impl IntoResponse> {
    let order_id = body.require()?;
    let status = state.orders().cancel_order(&user.id, &order_id).await?;
    Ok(Json(json!({ "status": status })))
}

/// Line items of a past order, to refill the cart client-side.
///
/// POST /api/reorder
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn reorder(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<OrderRef>,
) -> Result<impl IntoResponse> {
    let order_id = body.require()?;
    let items = state.orders().reorder(&user.id, &order_id).await?;
    Ok(Json(json!({ "cart": items })))
}
