//! Serializable views of the floor for external renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::{BotId, Order, OrderClass, OrderId};

/// One pending or completed order as shown to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub class: OrderClass,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            class: order.class,
        }
    }
}

/// What a bot is doing at the instant of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum BotActivity {
    Idle,
    Processing {
        order_id: OrderId,
        class: OrderClass,
        seconds_left: u32,
    },
}

/// Per-bot entry in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotStatusView {
    pub id: BotId,
    pub activity: BotActivity,
}

/// Atomic-as-observed view of the whole floor.
///
/// Assembled in one pass under the floor lock, so every submitted order id
/// appears in exactly one of `pending`, a bot's `Processing` activity, or
/// `completed`, never two and never none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSnapshot {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Pending orders in serve order.
    pub pending: Vec<OrderView>,

    /// Completed orders in completion order.
    pub completed: Vec<OrderView>,

    /// One entry per bot, ascending id.
    pub bots: Vec<BotStatusView>,
}

impl FloorSnapshot {
    /// Snapshot of a floor with nothing submitted and no bots.
    pub fn empty() -> Self {
        Self {
            timestamp: Utc::now(),
            pending: Vec::new(),
            completed: Vec::new(),
            bots: Vec::new(),
        }
    }

    /// Ids of orders currently held by bots, in ascending bot id.
    pub fn in_flight(&self) -> Vec<OrderId> {
        self.bots
            .iter()
            .filter_map(|bot| match bot.activity {
                BotActivity::Processing { order_id, .. } => Some(order_id),
                BotActivity::Idle => None,
            })
            .collect()
    }

    /// Every order id visible anywhere in the snapshot.
    pub fn all_order_ids(&self) -> Vec<OrderId> {
        let mut ids: Vec<OrderId> = self.pending.iter().map(|o| o.id).collect();
        ids.extend(self.in_flight());
        ids.extend(self.completed.iter().map(|o| o.id));
        ids
    }
}
