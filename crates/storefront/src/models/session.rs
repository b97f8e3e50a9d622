//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use bazaar_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. The
/// id is re-checked against the user store whenever it matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's store ID.
    pub id: UserId,
    /// Display name chosen at signup.
    pub username: String,
    /// Normalized email address.
    pub email: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
