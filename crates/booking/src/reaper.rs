//! Hold reaper: reclaims lapsed holds and records their expiry.

use chrono::{DateTime, Utc};
use seat_store::{SeatState, SeatStore, SeatTransition};

use crate::error::{BookingError, Result};
use crate::ledger::OrderLedger;
use crate::order::{Order, OrderStatus};

/// Reclaims seats of pending orders whose hold deadline has passed.
///
/// The reaper owns no schedule; an external scheduler decides the cadence
/// and calls [`HoldReaper::sweep`]. It is safe to run concurrently with
/// reservation and confirmation calls: who gets a contested seat is decided
/// by the seat store's transition primitive, never by comparing clocks.
pub struct HoldReaper<S, L> {
    store: S,
    ledger: L,
}

impl<S, L> HoldReaper<S, L>
where
    S: SeatStore,
    L: OrderLedger,
{
    /// Creates a new reaper over the shared store and ledger.
    pub fn new(store: S, ledger: L) -> Self {
        Self { store, ledger }
    }

    /// Returns every pending order whose hold deadline is at or before `at`.
    pub async fn expired_holds(&self, at: DateTime<Utc>) -> Result<Vec<Order>> {
        self.ledger.expired_pending(at).await
    }

    /// Releases the seats of every lapsed hold and marks the orders
    /// `Expired`. Returns the orders that were expired by this sweep.
    ///
    /// Seats are released one at a time: an expired order whose seats were
    /// partially taken over by newer reservations is still reclaimed seat by
    /// seat. An order whose seats were sold by a racing confirmation is left
    /// alone.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self, at: DateTime<Utc>) -> Result<Vec<Order>> {
        let sweep_start = std::time::Instant::now();
        let expired = self.ledger.expired_pending(at).await?;

        let mut reaped = Vec::new();
        for order in expired {
            let mut released = 0usize;
            for seat in order.seats() {
                let outcome = self
                    .store
                    .transition(
                        order.showing(),
                        vec![SeatTransition::release_hold(seat.clone(), order.id())],
                    )
                    .await?;
                if outcome.is_applied() {
                    released += 1;
                }
            }

            if released == 0 {
                // Nothing of the hold remained. Seats sold to this order
                // mean a confirmation won the race at the store; the order
                // belongs to it now.
                if let Some(first) = order.seats().first()
                    && let Some(state) = self.store.seat_state(order.showing(), first).await?
                    && state == (SeatState::Sold { order: order.id() })
                {
                    continue;
                }
            }

            match self
                .ledger
                .update_status(order.id(), OrderStatus::Expired)
                .await
            {
                Ok(expired_order) => {
                    metrics::counter!("holds_reaped").increment(1);
                    tracing::info!(order_id = %order.id(), released, "expired hold reclaimed");
                    reaped.push(expired_order);
                }
                // A racing confirm or cancel moved the order on first.
                Err(BookingError::InvalidState { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        metrics::histogram!("reaper_sweep_seconds").record(sweep_start.elapsed().as_secs_f64());
        Ok(reaped)
    }
}
