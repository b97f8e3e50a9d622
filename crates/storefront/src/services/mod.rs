//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Signup and login against the credential store
//! - `cart` - Signed cart cookie and its catalog view
//! - `orders` - Checkout, payment verification, history
//! - `reconcile` - Order log vs. user history consistency report

pub mod auth;
pub mod cart;
pub mod orders;
pub mod reconcile;
