//! Order records and priority classes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to an order at submission. Monotonic, starting at 1,
/// never reused.
pub type OrderId = u64;

/// Identifier of a bot slot. Always the contiguous range `1..=N` while the
/// pool holds N workers.
pub type BotId = usize;

/// Priority class attached to an order at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderClass {
    Vip,
    Normal,
}

impl OrderClass {
    /// Serve priority derived from the class. Lower is served first.
    pub fn priority(&self) -> u8 {
        match self {
            OrderClass::Vip => 1,
            OrderClass::Normal => 2,
        }
    }

    /// Returns the display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderClass::Vip => "VIP",
            OrderClass::Normal => "Normal",
        }
    }
}

impl std::fmt::Display for OrderClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vip" | "v" => Ok(OrderClass::Vip),
            "normal" | "norm" | "n" => Ok(OrderClass::Normal),
            _ => Err(format!("Unknown order class: {}", s)),
        }
    }
}

/// A submitted order. Immutable once created; conceptual ownership moves
/// from the pending queue to a bot slot to the completed list (or back to
/// the queue when a bot is removed mid-service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique id, assigned in submission order.
    pub id: OrderId,
    /// Priority class, fixed at submission.
    pub class: OrderClass,
    /// When the order entered the system. Display only; never used for
    /// ordering.
    pub submitted_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: OrderId, class: OrderClass) -> Self {
        Self {
            id,
            class,
            submitted_at: Utc::now(),
        }
    }

    /// Serve priority of this order.
    pub fn priority(&self) -> u8 {
        self.class.priority()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_class_priority_ordering() {
        assert_eq!(OrderClass::Vip.priority(), 1);
        assert_eq!(OrderClass::Normal.priority(), 2);
        assert!(OrderClass::Vip.priority() < OrderClass::Normal.priority());
    }

    #[test]
    fn test_class_display() {
        assert_eq!(OrderClass::Vip.to_string(), "VIP");
        assert_eq!(OrderClass::Normal.to_string(), "Normal");
    }

    #[test]
    fn test_class_from_str() {
        assert_eq!(OrderClass::from_str("vip").unwrap(), OrderClass::Vip);
        assert_eq!(OrderClass::from_str("VIP").unwrap(), OrderClass::Vip);
        assert_eq!(OrderClass::from_str("normal").unwrap(), OrderClass::Normal);
        assert_eq!(OrderClass::from_str("n").unwrap(), OrderClass::Normal);
        assert!(OrderClass::from_str("express").is_err());
    }

    #[test]
    fn test_order_carries_class_priority() {
        let order = Order::new(7, OrderClass::Vip);
        assert_eq!(order.id, 7);
        assert_eq!(order.priority(), 1);
    }
}
