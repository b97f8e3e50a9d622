//! Domain models for the storefront.
//!
//! These are the serialized shapes of the JSON documents under the data
//! directory plus the types that flow between services and routes.

pub mod cart;
pub mod contact;
pub mod order;
pub mod session;
pub mod user;
pub(crate) mod wire;

pub use cart::{Cart, CartEntry};
pub use contact::ContactResponse;
pub use order::{LineItem, OrderRecord, OrderView, ShippingAddress, StagedOrder};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{UserRecord, UsersDocument};
