//! Order lifecycle error types.

use thiserror::Error;

use bazaar_core::OrderId;

use crate::db::RepositoryError;
use crate::payments::GatewayError;

/// Problems computing an order total from a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid product in cart")]
    InvalidProduct,

    #[error("Order total is too large")]
    Overflow,
}

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No authenticated identity, or one the user store doesn't know.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Request is missing or has invalid fields.
    #[error("{0}")]
    Validation(String),

    /// Cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Order, staged order or history entry is absent.
    #[error("{0}")]
    NotFound(&'static str),

    /// Payment signature did not verify.
    #[error("payment verification failed")]
    VerificationFailed,

    /// A staged order already exists under this gateway order id.
    #[error("duplicate staged order: {0}")]
    DuplicateKey(OrderId),

    /// Payment gateway call failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Reading or writing a store failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
