use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::{SeatLabel, ShowingId};

use crate::error::{Result, SeatStoreError};
use crate::state::{SeatState, SeatStatus};
use crate::transition::{SeatTransition, TransitionOutcome};

/// Core trait for seat inventory store implementations.
///
/// The store is the single shared mutable resource of the booking system;
/// all seat mutation goes through [`SeatStore::transition`]. Implementations
/// must be thread-safe (Send + Sync) and must serialize transitions per
/// showing so that two overlapping multi-seat batches can never both be
/// admitted.
#[async_trait]
pub trait SeatStore: Send + Sync {
    /// Atomically applies a batch of compare-and-transition operations for
    /// one showing.
    ///
    /// Every predicate is evaluated against the seat states as of one
    /// serialization point. If all hold, every target state is written and
    /// the call returns [`TransitionOutcome::Applied`]; if any fails,
    /// nothing is written and the failing seats are reported. Transitions
    /// for different showings may proceed fully in parallel.
    async fn transition(
        &self,
        showing: ShowingId,
        transitions: Vec<SeatTransition>,
    ) -> Result<TransitionOutcome>;

    /// Returns the recorded state of every seat of a showing.
    ///
    /// Seats the store has never written are absent; absent means free.
    async fn seat_states(&self, showing: ShowingId) -> Result<BTreeMap<SeatLabel, SeatState>>;

    /// Returns the recorded state of one seat, or None if never written.
    async fn seat_state(&self, showing: ShowingId, seat: &SeatLabel) -> Result<Option<SeatState>>;
}

/// Extension trait providing convenience queries over seat stores.
#[async_trait]
pub trait SeatStoreExt: SeatStore {
    /// The seat-availability view: every recorded seat collapsed to
    /// [`SeatStatus`] as of `at`, expired holds reported as free.
    async fn availability(
        &self,
        showing: ShowingId,
        at: DateTime<Utc>,
    ) -> Result<BTreeMap<SeatLabel, SeatStatus>> {
        let states = self.seat_states(showing).await?;
        Ok(states
            .into_iter()
            .map(|(seat, state)| (seat, state.status_at(at)))
            .collect())
    }

    /// Returns true if the seat would be admitted to a new hold at `at`.
    async fn is_available(
        &self,
        showing: ShowingId,
        seat: &SeatLabel,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self
            .seat_state(showing, seat)
            .await?
            .is_none_or(|state| state.is_available_at(at)))
    }
}

// Blanket implementation for all SeatStore implementations
impl<T: SeatStore + ?Sized> SeatStoreExt for T {}

/// Validates a transition batch before execution.
///
/// A batch must be non-empty and must not name the same seat twice; a
/// duplicate would make the batch's outcome depend on application order.
pub fn validate_transition_batch(transitions: &[SeatTransition]) -> Result<()> {
    if transitions.is_empty() {
        return Err(SeatStoreError::InvalidBatch(
            "transition batch is empty".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(transitions.len());
    for transition in transitions {
        if !seen.insert(&transition.seat) {
            return Err(SeatStoreError::InvalidBatch(format!(
                "seat {} appears more than once",
                transition.seat
            )));
        }
    }

    Ok(())
}
