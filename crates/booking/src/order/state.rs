//! Order status machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Confirmed ──► Cancelled
///           ├──► Cancelled
///           └──► Expired
/// ```
///
/// `Cancelled` and `Expired` are terminal. A `Pending` order past its hold
/// deadline is treated as expired by every reader even before the reaper
/// records the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Seats are held, awaiting confirmation or expiry.
    #[default]
    Pending,

    /// Seats are sold to this order.
    Confirmed,

    /// The order was cancelled and its seats released (terminal).
    Cancelled,

    /// The hold lapsed and was reclaimed (terminal).
    Expired,
}

impl OrderStatus {
    /// Returns true if the order can be confirmed in this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Returns true if the reaper can expire the order in this status.
    pub fn can_expire(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Expired)
    }

    /// Returns true if the status machine admits `self -> next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (
                OrderStatus::Pending,
                OrderStatus::Confirmed | OrderStatus::Cancelled | OrderStatus::Expired
            ) | (OrderStatus::Confirmed, OrderStatus::Cancelled)
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Expired => "Expired",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
