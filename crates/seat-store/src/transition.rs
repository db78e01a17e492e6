//! Compare-and-transition building blocks.
//!
//! A reservation rule is expressed as a batch of [`SeatTransition`]s: one
//! predicate and one target state per seat. The store applies a batch all or
//! nothing, so every higher-level booking rule reduces to a single
//! [`crate::SeatStore::transition`] call.

use chrono::{DateTime, Utc};
use common::{OrderId, SeatLabel};
use serde::{Deserialize, Serialize};

use crate::state::SeatState;

/// Predicate a seat must satisfy for its transition to be admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedState {
    /// Free, or held by a hold whose deadline is at or before `at`.
    Available { at: DateTime<Utc> },

    /// Held by `order` with a deadline strictly after `at`.
    ActiveHold { order: OrderId, at: DateTime<Utc> },

    /// Held by `order`; the deadline is not consulted.
    AnyHold { order: OrderId },

    /// Sold to `order`.
    SoldTo { order: OrderId },
}

impl ExpectedState {
    /// Evaluates the predicate against a seat's current state.
    pub fn matches(&self, state: &SeatState) -> bool {
        match (self, state) {
            (ExpectedState::Available { at }, _) => state.is_available_at(*at),
            (
                ExpectedState::ActiveHold { order, at },
                SeatState::Held { order: held, expires_at },
            ) => held == order && *expires_at > *at,
            (ExpectedState::AnyHold { order }, SeatState::Held { order: held, .. }) => {
                held == order
            }
            (ExpectedState::SoldTo { order }, SeatState::Sold { order: sold }) => sold == order,
            _ => false,
        }
    }
}

/// One seat's part of an atomic transition batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatTransition {
    /// The seat this transition targets.
    pub seat: SeatLabel,

    /// Predicate the seat must satisfy.
    pub expect: ExpectedState,

    /// State the seat moves to when the whole batch is admitted.
    pub to: SeatState,
}

impl SeatTransition {
    /// Free (or expired-hold) seat moves to a new hold.
    pub fn hold(
        seat: SeatLabel,
        order: OrderId,
        at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            seat,
            expect: ExpectedState::Available { at },
            to: SeatState::Held { order, expires_at },
        }
    }

    /// A still-valid hold owned by `order` moves to sold.
    pub fn sell(seat: SeatLabel, order: OrderId, at: DateTime<Utc>) -> Self {
        Self {
            seat,
            expect: ExpectedState::ActiveHold { order, at },
            to: SeatState::Sold { order },
        }
    }

    /// A hold owned by `order` is released, deadline ignored.
    pub fn release_hold(seat: SeatLabel, order: OrderId) -> Self {
        Self {
            seat,
            expect: ExpectedState::AnyHold { order },
            to: SeatState::Free,
        }
    }

    /// A sold seat owned by `order` is released.
    pub fn release_sold(seat: SeatLabel, order: OrderId) -> Self {
        Self {
            seat,
            expect: ExpectedState::SoldTo { order },
            to: SeatState::Free,
        }
    }
}

/// Result of an atomic transition batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Every predicate held; every target state was written.
    Applied,

    /// At least one predicate failed; nothing was written. `conflicts`
    /// lists exactly the seats whose predicate failed, in label order.
    Rejected { conflicts: Vec<SeatLabel> },
}

impl TransitionOutcome {
    /// Returns true if the batch was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied)
    }

    /// Returns the conflicting seats of a rejected batch, if any.
    pub fn conflicts(&self) -> Option<&[SeatLabel]> {
        match self {
            TransitionOutcome::Applied => None,
            TransitionOutcome::Rejected { conflicts } => Some(conflicts),
        }
    }
}
