//! Consistency check between the order log and user histories.
//!
//! A commit writes the log first and the user's history second, so an
//! interrupted commit leaves an order that only the log knows about. Status
//! is not compared: cancellation only touches the history.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use bazaar_core::{OrderId, UserId};

use crate::models::{OrderRecord, UsersDocument};

/// Orders that appear on only one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// In the order log but in no user's history.
    pub log_only: Vec<OrderId>,
    /// In a user's history but not in the order log.
    pub history_only: Vec<(UserId, OrderId)>,
}

impl ReconcileReport {
    /// Whether both sides agree.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.log_only.is_empty() && self.history_only.is_empty()
    }
}

/// Compare the order log with every user's history.
#[must_use]
pub fn reconcile(log: &[OrderRecord], users: &UsersDocument) -> ReconcileReport {
    let logged: BTreeSet<&OrderId> = log.iter().map(|o| &o.order_id).collect();

    let mut owners: BTreeMap<&OrderId, &UserId> = BTreeMap::new();
    for user in &users.users {
        for order in &user.orders {
            owners.entry(&order.order_id).or_insert(&user.id);
        }
    }

    ReconcileReport {
        log_only: logged
            .iter()
            .filter(|id| !owners.contains_key(*id))
            .map(|id| (*id).clone())
            .collect(),
        history_only: owners
            .iter()
            .filter(|(id, _)| !logged.contains(*id))
            .map(|(id, user)| ((*user).clone(), (*id).clone()))
            .collect(),
    }
}
