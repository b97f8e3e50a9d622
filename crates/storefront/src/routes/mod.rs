//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (data directory reachable)
//!
//! # Accounts
//! POST /api/signup             - Form signup, redirects to /
//! POST /api/login              - Form login, redirects to /
//! GET  /auth/logout            - Logout, redirects to /
//! POST /auth/logout            - Logout, redirects to /
//! GET  /api/me                 - Session identity or null
//!
//! # Catalog
//! GET  /api/products           - Product listing
//! GET  /api/product/{id}       - Product detail
//!
//! # Cart (signed cookie)
//! GET  /api/cart               - Cart joined with the catalog
//! GET  /api/cart/get           - Raw cart entries
//! POST /api/add/cart           - Add one of a product
//! POST /api/remove/cart        - Remove one of a product
//!
//! # Checkout
//! POST /create-order           - Price cart, create gateway order
//! POST /verify-payment         - Verify signature, commit order
//!
//! # Orders (requires auth)
//! GET  /api/get-orders         - History with delivery estimates
//! POST /api/cancel-order       - Cancel an order
//! POST /api/reorder            - Items of a past order
//!
//! # Contact
//! POST /api/save/response      - Store a contact form submission
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod orders;
pub mod products;

use axum::{
    Router,
    extract::{FromRequest, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// JSON body extractor whose rejection is the usual JSON error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the data directory is gone.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.stores().is_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Create the signup and login routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
}

/// Create the JSON API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(auth::me))
        .route("/api/products", get(products::index))
        .route("/api/product/{id}", get(products::show))
        .route("/api/cart", get(cart::show))
        .route("/api/cart/get", get(cart::get))
        .route("/api/add/cart", post(cart::add))
        .route("/api/remove/cart", post(cart::remove))
        .route("/create-order", post(checkout::create_order))
        .route("/verify-payment", post(checkout::verify_payment))
        .route("/api/get-orders", get(orders::list))
        .route("/api/cancel-order", post(orders::cancel))
        .route("/api/reorder", post(orders::reorder))
        .route("/api/save/response", post(contact::save_response))
}

/// Create all routes for the storefront.
///
/// Rate limiters are attached per group when `rate_limit` is set.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    let mut auth = auth_routes();
    let mut api = api_routes();

    if rate_limit {
        if let Some(limiter) = auth_rate_limiter() {
            auth = auth.layer(limiter);
        }
        if let Some(limiter) = api_rate_limiter() {
            api = api.layer(limiter);
        }
    }

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/auth/logout", get(auth::logout).post(auth::logout))
        .merge(auth)
        .merge(api)
}
