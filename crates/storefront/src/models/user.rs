//! User domain types.
//!
//! `UserRecord` is both the stored shape in `users.json` and the domain type;
//! there is no separate row type.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, OrderId, UserId};

use super::order::OrderRecord;
use super::session::CurrentUser;

/// A storefront account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user ID (32 hex chars).
    pub id: UserId,
    /// Display name chosen at signup.
    pub username: String,
    /// Unique, normalized email address.
    pub email: Email,
    /// Argon2id PHC string.
    #[serde(rename = "password")]
    pub password_hash: String,
    /// Client IP at signup.
    #[serde(default)]
    pub ip: Option<String>,
    /// Committed orders, oldest first.
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}

impl UserRecord {
    /// First order in this user's history with the given id.
    #[must_use]
    pub fn find_order(&self, order_id: &OrderId) -> Option<&OrderRecord> {
        self.orders.iter().find(|o| &o.order_id == order_id)
    }

    /// Session identity for this user.
    #[must_use]
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.as_str().to_owned(),
        }
    }
}

/// Top-level shape of `users.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersDocument {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}
