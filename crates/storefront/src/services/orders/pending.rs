//! Pending order stage.
//!
//! Holds priced orders between gateway order creation and payment
//! verification. Entries are consumed exactly once by `take`, expire after a
//! TTL and do not survive a restart.

use std::time::{Duration, Instant};

use moka::future::Cache;

use bazaar_core::OrderId;

use super::OrderError;
use crate::models::StagedOrder;

/// Maximum number of concurrently staged orders.
const MAX_STAGED_ORDERS: u64 = 10_000;

#[derive(Debug, Clone)]
struct Staged {
    order: StagedOrder,
    staged_at: Instant,
}

/// TTL-bounded map of gateway order id to staged order.
#[derive(Clone)]
pub struct PendingOrders {
    cache: Cache<OrderId, Staged>,
    ttl: Duration,
}

impl PendingOrders {
    /// Create an empty stage whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_STAGED_ORDERS)
            .time_to_live(ttl)
            .build();

        Self { cache, ttl }
    }

    /// Stage an order under its gateway order id.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::DuplicateKey` if the id is already staged.
    pub async fn stage(&self, order_id: OrderId, order: StagedOrder) -> Result<(), OrderError> {
        let staged = Staged {
            order,
            staged_at: Instant::now(),
        };
        let entry = self
            .cache
            .entry(order_id.clone())
            .or_insert(staged.clone())
            .await;

        if entry.is_fresh() {
            return Ok(());
        }
        if self.is_expired(entry.value()) {
            self.cache.insert(order_id, staged).await;
            return Ok(());
        }
        Err(OrderError::DuplicateKey(order_id))
    }

    /// Put back an order that was taken but could not be committed.
    pub async fn restore(&self, order_id: OrderId, order: StagedOrder) {
        self.cache
            .insert(
                order_id,
                Staged {
                    order,
                    staged_at: Instant::now(),
                },
            )
            .await;
    }

    /// Read a staged order without consuming it.
    pub async fn peek(&self, order_id: &OrderId) -> Option<StagedOrder> {
        self.cache
            .get(order_id)
            .await
            .filter(|staged| !self.is_expired(staged))
            .map(|staged| staged.order)
    }

    /// Atomically remove and return a staged order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the id is unknown, already taken or
    /// expired.
    pub async fn take(&self, order_id: &OrderId) -> Result<StagedOrder, OrderError> {
        self.cache
            .remove(order_id)
            .await
            .filter(|staged| !self.is_expired(staged))
            .map(|staged| staged.order)
            .ok_or(OrderError::NotFound("Order not found"))
    }

    fn is_expired(&self, staged: &Staged) -> bool {
        staged.staged_at.elapsed() >= self.ttl
    }
}

impl std::fmt::Debug for PendingOrders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingOrders")
            .field("entries", &self.cache.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bazaar_core::Amount;

    use super::*;
    use crate::models::ShippingAddress;

    fn staged(total: i64) -> StagedOrder {
        StagedOrder {
            items: Vec::new(),
            subtotal: Amount::new(total),
            tax: Amount::ZERO,
            grand_total: Amount::new(total),
            shipping_address: ShippingAddress::default(),
        }
    }

    #[tokio::test]
    async fn test_stage_peek_take() {
        let pending = PendingOrders::new(Duration::from_secs(60));
        let id = OrderId::new("order_1");

        pending.stage(id.clone(), staged(210)).await.unwrap();
        assert_eq!(
            pending.peek(&id).await.map(|o| o.grand_total),
            Some(Amount::new(210))
        );

        let taken = pending.take(&id).await.unwrap();
        assert_eq!(taken.grand_total, Amount::new(210));

        assert!(pending.peek(&id).await.is_none());
        assert!(matches!(
            pending.take(&id).await,
            Err(OrderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stage_rejects_duplicate_key() {
        let pending = PendingOrders::new(Duration::from_secs(60));
        let id = OrderId::new("order_1");

        pending.stage(id.clone(), staged(100)).await.unwrap();
        let err = pending.stage(id.clone(), staged(999)).await.unwrap_err();

        assert!(matches!(err, OrderError::DuplicateKey(_)));
        assert_eq!(
            pending.peek(&id).await.map(|o| o.grand_total),
            Some(Amount::new(100))
        );
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let pending = PendingOrders::new(Duration::from_millis(50));
        let id = OrderId::new("order_1");

        pending.stage(id.clone(), staged(100)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(pending.peek(&id).await.is_none());
        assert!(pending.take(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_take_yields_one_winner() {
        let pending = Arc::new(PendingOrders::new(Duration::from_secs(60)));
        let id = OrderId::new("order_1");
        pending.stage(id.clone(), staged(100)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let pending = Arc::clone(&pending);
            let id = id.clone();
            handles.push(tokio::spawn(async move { pending.take(&id).await.is_ok() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
