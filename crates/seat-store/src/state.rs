//! Seat state model.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

/// The state of a single seat within one showing.
///
/// A seat is always in exactly one of these states. A `Held` seat carries
/// the deadline of its hold; once the deadline passes the hold is no longer
/// valid, and every reader must treat the seat as free even if no sweep has
/// rewritten the record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state")]
pub enum SeatState {
    /// Nobody has a claim on the seat.
    #[default]
    Free,

    /// A pending order holds the seat until `expires_at`.
    Held {
        order: OrderId,
        expires_at: DateTime<Utc>,
    },

    /// A confirmed order owns the seat.
    Sold { order: OrderId },
}

impl SeatState {
    /// Returns true if the seat can be handed to a new hold at `at`.
    ///
    /// An expired hold counts as available; this is the deadline rule that
    /// keeps an unswept stale hold from blocking new bookings.
    pub fn is_available_at(&self, at: DateTime<Utc>) -> bool {
        match self {
            SeatState::Free => true,
            SeatState::Held { expires_at, .. } => *expires_at <= at,
            SeatState::Sold { .. } => false,
        }
    }

    /// Returns the order currently referenced by the seat, if any.
    pub fn order(&self) -> Option<OrderId> {
        match self {
            SeatState::Free => None,
            SeatState::Held { order, .. } | SeatState::Sold { order } => Some(*order),
        }
    }

    /// Collapses the state into its availability-view status as of `at`.
    pub fn status_at(&self, at: DateTime<Utc>) -> SeatStatus {
        match self {
            SeatState::Free => SeatStatus::Free,
            SeatState::Held { expires_at, .. } if *expires_at <= at => SeatStatus::Free,
            SeatState::Held { .. } => SeatStatus::Held,
            SeatState::Sold { .. } => SeatStatus::Sold,
        }
    }
}

/// Availability-view status of a seat, with expired holds already collapsed
/// to [`SeatStatus::Free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatStatus {
    Free,
    Held,
    Sold,
}

impl SeatStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Free => "Free",
            SeatStatus::Held => "Held",
            SeatStatus::Sold => "Sold",
        }
    }
}

impl std::fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
