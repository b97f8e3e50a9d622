//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `storefront` - Public-facing storefront API (cart, checkout, orders)
//! - `cli` - Command-line tools for reconciliation and catalog checks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no file access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, amounts, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
