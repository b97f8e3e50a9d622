//! Global order log over `orders.json`.
//!
//! The log is an audit trail of commits: records are appended once and never
//! updated, so later cancellations only show up in user histories.

use super::{Document, Mutation, RepositoryError};
use crate::models::OrderRecord;

/// Repository for the append-only order log.
pub struct OrderLogRepository<'a> {
    doc: &'a Document<Vec<OrderRecord>>,
}

impl<'a> OrderLogRepository<'a> {
    #[must_use]
    pub const fn new(doc: &'a Document<Vec<OrderRecord>>) -> Self {
        Self { doc }
    }

    /// Append a committed order and return the logged record.
    ///
    /// An order id that is already logged keeps its first record and nothing
    /// is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the document cannot be written.
    pub async fn append(&self, order: OrderRecord) -> Result<OrderRecord, RepositoryError> {
        self.doc
            .update_with(|orders| {
                if let Some(logged) = orders.iter().find(|o| o.order_id == order.order_id) {
                    return Ok(Mutation::Unchanged(logged.clone()));
                }
                orders.push(order.clone());
                Ok(Mutation::Changed(order))
            })
            .await
    }

    /// All logged orders, oldest first.
    pub async fn list(&self) -> Vec<OrderRecord> {
        self.doc.snapshot().await
    }
}
