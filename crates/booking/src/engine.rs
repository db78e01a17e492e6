//! Reservation engine.
//!
//! Turns a "reserve these seats" request into either a pending order or a
//! structured rejection. Every booking rule is expressed as one atomic
//! multi-seat transition against the seat store, which is what makes the
//! all-or-nothing guarantee hold under concurrency: of any set of racing
//! requests for overlapping seats, exactly one observes all its seats free.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use common::{OrderId, SeatLabel, ShowingId, UserId};
use seat_store::{SeatStore, SeatTransition, TransitionOutcome};

use crate::catalog::Catalog;
use crate::error::{BookingError, Result};
use crate::ledger::OrderLedger;
use crate::order::{Order, OrderStatus};

/// Reservation engine over a seat store, an order ledger and a catalog.
///
/// Holds are time-bounded by `hold_ttl`; confirmation is a separate call so
/// that no seat lock is ever held across an external step such as payment.
pub struct ReservationEngine<S, L, C> {
    store: S,
    ledger: L,
    catalog: C,
    hold_ttl: Duration,
}

impl<S, L, C> ReservationEngine<S, L, C>
where
    S: SeatStore,
    L: OrderLedger,
    C: Catalog,
{
    /// Creates a new engine with the given hold TTL.
    pub fn new(store: S, ledger: L, catalog: C, hold_ttl: Duration) -> Self {
        Self {
            store,
            ledger,
            catalog,
            hold_ttl,
        }
    }

    /// Returns the configured hold TTL.
    pub fn hold_ttl(&self) -> Duration {
        self.hold_ttl
    }

    /// Returns a reference to the underlying seat store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the underlying order ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Attempts to hold a set of seats for a user.
    ///
    /// All requested seats are held together or none are. On contention the
    /// call mutates nothing and reports exactly the requested seats that
    /// were unavailable, so the caller can retry for the rest or abort; the
    /// engine itself never retries.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(
        &self,
        showing: ShowingId,
        user: UserId,
        seats: Vec<SeatLabel>,
    ) -> Result<Order> {
        metrics::counter!("reservations_total").increment(1);

        if seats.is_empty() {
            return Err(BookingError::InvalidRequest {
                reason: "seat list is empty".to_string(),
            });
        }
        let mut seen = HashSet::with_capacity(seats.len());
        for seat in &seats {
            if !seen.insert(seat) {
                return Err(BookingError::InvalidRequest {
                    reason: format!("seat {seat} requested more than once"),
                });
            }
        }

        let universe = self.catalog.seat_labels(showing).await?;
        let unknown: Vec<SeatLabel> = seats
            .iter()
            .filter(|s| !universe.contains(*s))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(BookingError::UnknownSeat {
                showing,
                seats: unknown,
            });
        }

        let order_id = OrderId::new();
        let now = Utc::now();
        let expires_at = now + self.hold_ttl;

        let batch: Vec<SeatTransition> = seats
            .iter()
            .map(|seat| SeatTransition::hold(seat.clone(), order_id, now, expires_at))
            .collect();

        match self.store.transition(showing, batch).await? {
            TransitionOutcome::Applied => {}
            TransitionOutcome::Rejected { conflicts } => {
                metrics::counter!("reservations_conflicted").increment(1);
                tracing::info!(%showing, %user, "reservation lost seat contention");
                return Err(BookingError::SeatsUnavailable { conflicts });
            }
        }

        let order = Order::pending(order_id, user, showing, seats, now, expires_at);
        self.ledger.append(order.clone()).await?;

        metrics::counter!("holds_created").increment(1);
        tracing::info!(%order_id, %showing, %user, seat_count = order.seats().len(), "hold created");
        Ok(order)
    }

    /// Confirms a still-valid pending order, selling its seats.
    ///
    /// The race against the reaper is decided by the seat store: if the
    /// hold was already reclaimed, the sell batch is rejected and the call
    /// fails with `OrderExpired` rather than silently succeeding.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(&self, order_id: OrderId) -> Result<Order> {
        let order = self
            .ledger
            .find(order_id)
            .await?
            .ok_or(BookingError::OrderNotFound(order_id))?;

        // An already-reaped hold reports expiry, not a lifecycle violation.
        if order.status() == OrderStatus::Expired {
            return Err(BookingError::OrderExpired(order_id));
        }
        if !order.status().can_confirm() {
            return Err(BookingError::InvalidState {
                status: order.status(),
                action: "confirm",
            });
        }

        let now = Utc::now();
        if order.is_expired_at(now) {
            return Err(BookingError::OrderExpired(order_id));
        }

        let batch: Vec<SeatTransition> = order
            .seats()
            .iter()
            .map(|seat| SeatTransition::sell(seat.clone(), order_id, now))
            .collect();

        match self.store.transition(order.showing(), batch).await? {
            TransitionOutcome::Applied => {}
            TransitionOutcome::Rejected { .. } => {
                tracing::info!(%order_id, "confirmation arrived after the hold was reclaimed");
                return Err(BookingError::OrderExpired(order_id));
            }
        }

        let confirmed = self
            .ledger
            .update_status(order_id, OrderStatus::Confirmed)
            .await?;

        metrics::counter!("orders_confirmed").increment(1);
        tracing::info!(%order_id, "order confirmed");
        Ok(confirmed)
    }

    /// Cancels a pending or confirmed order, releasing its seats.
    ///
    /// Idempotent for already-cancelled orders: the second call is a no-op
    /// success. Expired orders cannot be cancelled; their hold is gone.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        let order = self
            .ledger
            .find(order_id)
            .await?
            .ok_or(BookingError::OrderNotFound(order_id))?;

        let batch: Vec<SeatTransition> = match order.status() {
            OrderStatus::Cancelled => return Ok(order),
            OrderStatus::Expired => {
                return Err(BookingError::InvalidState {
                    status: OrderStatus::Expired,
                    action: "cancel",
                });
            }
            OrderStatus::Pending => order
                .seats()
                .iter()
                .map(|seat| SeatTransition::release_hold(seat.clone(), order_id))
                .collect(),
            OrderStatus::Confirmed => order
                .seats()
                .iter()
                .map(|seat| SeatTransition::release_sold(seat.clone(), order_id))
                .collect(),
        };

        match self.store.transition(order.showing(), batch).await? {
            TransitionOutcome::Applied => {}
            TransitionOutcome::Rejected { .. } => {
                // The seats changed hands under us: the reaper reclaimed the
                // lapsed hold, or a racing call moved the order on. Report
                // from the ledger rather than guessing.
                let current = self
                    .ledger
                    .find(order_id)
                    .await?
                    .ok_or(BookingError::OrderNotFound(order_id))?;
                return match current.status() {
                    OrderStatus::Cancelled => Ok(current),
                    _ => Err(BookingError::OrderExpired(order_id)),
                };
            }
        }

        let cancelled = self
            .ledger
            .update_status(order_id, OrderStatus::Cancelled)
            .await?;

        metrics::counter!("orders_cancelled").increment(1);
        tracing::info!(%order_id, "order cancelled");
        Ok(cancelled)
    }
}
