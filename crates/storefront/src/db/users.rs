//! User repository over `users.json`.
//!
//! Lookups scan the document under its lock; writes go through
//! [`Document::update`] so every change is persisted before it is visible.

use bazaar_core::{Email, OrderId, OrderStatus, UserId};

use super::{Document, Mutation, RepositoryError};
use crate::models::{OrderRecord, UserRecord, UsersDocument};

/// Fields needed to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub password_hash: String,
    pub ip: Option<String>,
}

/// Repository for user records and their order history.
pub struct UserRepository<'a> {
    doc: &'a Document<UsersDocument>,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(doc: &'a Document<UsersDocument>) -> Self {
        Self { doc }
    }

    /// Get a user by their ID.
    pub async fn get_by_id(&self, id: &UserId) -> Option<UserRecord> {
        self.doc
            .read(|d| d.users.iter().find(|u| &u.id == id).cloned())
            .await
    }

    /// Get a user by their email address.
    pub async fn get_by_email(&self, email: &Email) -> Option<UserRecord> {
        self.doc
            .read(|d| d.users.iter().find(|u| &u.email == email).cloned())
            .await
    }

    /// Get a user by their username (exact match).
    pub async fn get_by_username(&self, username: &str) -> Option<UserRecord> {
        self.doc
            .read(|d| d.users.iter().find(|u| u.username == username).cloned())
            .await
    }

    /// Get a user by a login identifier that may be an email or a username.
    ///
    /// Email matches are checked first across all users, then usernames.
    pub async fn get_by_login(&self, login: &str) -> Option<UserRecord> {
        let login = login.trim();
        self.doc
            .read(|d| {
                d.users
                    .iter()
                    .find(|u| u.email.matches(login))
                    .or_else(|| d.users.iter().find(|u| u.username == login))
                    .cloned()
            })
            .await
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Io` if the document cannot be written.
    pub async fn create(&self, new_user: NewUser) -> Result<UserRecord, RepositoryError> {
        self.doc
            .update(|d| {
                if d.users.iter().any(|u| u.email == new_user.email) {
                    return Err(RepositoryError::Conflict("email already exists".to_owned()));
                }

                let user = UserRecord {
                    id: new_user.id,
                    username: new_user.username,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    ip: new_user.ip,
                    orders: Vec::new(),
                };
                d.users.push(user.clone());
                Ok(user)
            })
            .await
    }

    /// Append a committed order to a user's history.
    ///
    /// An order already in the history is left as it is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Io` if the document cannot be written.
    pub async fn append_order(
        &self,
        user_id: &UserId,
        order: OrderRecord,
    ) -> Result<(), RepositoryError> {
        self.doc
            .update_with(|d| {
                let user = d
                    .users
                    .iter_mut()
                    .find(|u| &u.id == user_id)
                    .ok_or(RepositoryError::NotFound)?;
                if user.find_order(&order.order_id).is_some() {
                    return Ok(Mutation::Unchanged(()));
                }
                user.orders.push(order);
                Ok(Mutation::Changed(()))
            })
            .await
    }

    /// Replace a user's stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Io` if the document cannot be written.
    pub async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: String,
    ) -> Result<(), RepositoryError> {
        self.doc
            .update(|d| {
                let user = d
                    .users
                    .iter_mut()
                    .find(|u| &u.id == user_id)
                    .ok_or(RepositoryError::NotFound)?;
                user.password_hash = password_hash;
                Ok(())
            })
            .await
    }

    /// Mark the first matching order in a user's history as cancelled.
    ///
    /// Cancelling an already-cancelled order succeeds without a write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or order doesn't exist.
    /// Returns `RepositoryError::Io` if the document cannot be written.
    pub async fn cancel_order(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
    ) -> Result<OrderStatus, RepositoryError> {
        self.doc
            .update_with(|d| {
                let order = d
                    .users
                    .iter_mut()
                    .find(|u| &u.id == user_id)
                    .and_then(|u| u.orders.iter_mut().find(|o| &o.order_id == order_id))
                    .ok_or(RepositoryError::NotFound)?;

                if order.status.is_cancelled() {
                    return Ok(Mutation::Unchanged(order.status));
                }
                order.status = OrderStatus::Cancelled;
                Ok(Mutation::Changed(order.status))
            })
            .await
    }

    /// A user's order history, or `None` if the user doesn't exist.
    pub async fn orders(&self, user_id: &UserId) -> Option<Vec<OrderRecord>> {
        self.doc
            .read(|d| {
                d.users
                    .iter()
                    .find(|u| &u.id == user_id)
                    .map(|u| u.orders.clone())
            })
            .await
    }

    /// First order with `order_id` in a user's history.
    pub async fn find_order(&self, user_id: &UserId, order_id: &OrderId) -> Option<OrderRecord> {
        self.doc
            .read(|d| {
                d.users
                    .iter()
                    .find(|u| &u.id == user_id)
                    .and_then(|u| u.find_order(order_id))
                    .cloned()
            })
            .await
    }
}
