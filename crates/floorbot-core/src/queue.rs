//! Pending-order container ordered by serve priority.

use std::collections::BTreeMap;

use crate::order::Order;

/// Sort key for pending orders: priority class first, arrival second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ServeKey {
    priority: u8,
    seq: u64,
}

/// Ordered multiset of pending orders keyed by `(priority, arrival seq)`.
///
/// Pure container with no synchronization of its own; it is owned by
/// [`FloorState`](crate::state::FloorState) and only touched under the floor
/// lock. The arrival sequence strictly increases across pushes, including
/// requeues, so two orders of the same class always serve in push order and
/// a later VIP order never overtakes an earlier pending one.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    orders: BTreeMap<ServeKey, Order>,
    next_seq: u64,
}

impl PendingQueue {
    /// Inserts an order behind all pending orders of its class.
    pub fn push(&mut self, order: Order) {
        let key = ServeKey {
            priority: order.priority(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.orders.insert(key, order);
    }

    /// Removes and returns the next order in serve order.
    pub fn pop_first(&mut self) -> Option<Order> {
        self.orders.pop_first().map(|(_, order)| order)
    }

    /// All pending orders in serve order.
    pub fn peek_all(&self) -> Vec<Order> {
        self.orders.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
