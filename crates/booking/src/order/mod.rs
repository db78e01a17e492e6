//! Order entity and status machine.

mod state;

pub use state::OrderStatus;

use chrono::{DateTime, Utc};
use common::{OrderId, SeatLabel, ShowingId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// A ticket order: one user, one showing, one or more seats.
///
/// Created `Pending` by the reservation engine when a multi-seat hold
/// succeeds. The seat set is immutable after creation; changing seats means
/// cancelling and reserving again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user: UserId,
    showing: ShowingId,
    seats: Vec<SeatLabel>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending order with the given hold deadline.
    pub fn pending(
        id: OrderId,
        user: UserId,
        showing: ShowingId,
        seats: Vec<SeatLabel>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user,
            showing,
            seats,
            status: OrderStatus::Pending,
            created_at,
            expires_at,
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the ordering user.
    pub fn user(&self) -> UserId {
        self.user
    }

    /// Returns the showing this order is for.
    pub fn showing(&self) -> ShowingId {
        self.showing
    }

    /// Returns the ordered seats, in request order.
    pub fn seats(&self) -> &[SeatLabel] {
        &self.seats
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns when the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the hold deadline.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if the order is a lapsed hold as of `at`.
    ///
    /// Readers must use this, not the status field alone: a `Pending` order
    /// past its deadline is no longer a valid hold even before the reaper
    /// records the `Expired` transition.
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        self.status == OrderStatus::Pending && self.expires_at <= at
    }

    /// Applies a status transition, enforcing the status machine.
    pub(crate) fn transition(&mut self, next: OrderStatus) -> Result<(), BookingError> {
        if !self.status.can_transition_to(next) {
            return Err(BookingError::InvalidState {
                status: self.status,
                action: transition_action(next),
            });
        }
        self.status = next;
        Ok(())
    }
}

fn transition_action(next: OrderStatus) -> &'static str {
    match next {
        OrderStatus::Pending => "reopen",
        OrderStatus::Confirmed => "confirm",
        OrderStatus::Cancelled => "cancel",
        OrderStatus::Expired => "expire",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending_order(ttl: Duration) -> Order {
        let now = Utc::now();
        Order::pending(
            OrderId::new(),
            UserId::new(),
            ShowingId::new(),
            vec![SeatLabel::new("1A"), SeatLabel::new("1B")],
            now,
            now + ttl,
        )
    }

    #[test]
    fn new_order_is_pending() {
        let order = pending_order(Duration::minutes(15));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.seats().len(), 2);
    }

    #[test]
    fn pending_order_past_deadline_reads_as_expired() {
        let order = pending_order(Duration::zero());
        assert!(order.is_expired_at(Utc::now()));
    }

    #[test]
    fn deadline_is_exclusive_of_validity() {
        let order = pending_order(Duration::minutes(5));
        // Exactly at the deadline the hold is no longer valid.
        assert!(order.is_expired_at(order.expires_at()));
        assert!(!order.is_expired_at(order.expires_at() - Duration::seconds(1)));
    }

    #[test]
    fn confirmed_order_never_reads_as_expired() {
        let mut order = pending_order(Duration::zero());
        order.transition(OrderStatus::Confirmed).unwrap();
        assert!(!order.is_expired_at(Utc::now()));
    }

    #[test]
    fn transition_enforces_the_machine() {
        let mut order = pending_order(Duration::minutes(5));
        order.transition(OrderStatus::Confirmed).unwrap();
        order.transition(OrderStatus::Cancelled).unwrap();

        let result = order.transition(OrderStatus::Confirmed);
        assert!(matches!(
            result,
            Err(BookingError::InvalidState {
                status: OrderStatus::Cancelled,
                action: "confirm",
            })
        ));
    }

    #[test]
    fn expired_is_terminal() {
        let mut order = pending_order(Duration::zero());
        order.transition(OrderStatus::Expired).unwrap();
        assert!(order.transition(OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn order_serialization_roundtrip() {
        let order = pending_order(Duration::minutes(15));
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
