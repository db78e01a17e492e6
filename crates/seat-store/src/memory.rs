use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use common::{SeatLabel, ShowingId};

use crate::error::Result;
use crate::state::SeatState;
use crate::store::{SeatStore, validate_transition_batch};
use crate::transition::{SeatTransition, TransitionOutcome};

type SeatMap = HashMap<SeatLabel, SeatState>;

/// In-memory seat store implementation.
///
/// Seat maps are sharded per showing behind their own mutex: transitions on
/// one showing serialize against each other, while unrelated showings
/// proceed in parallel. Provides the same interface and transition
/// semantics as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemorySeatStore {
    showings: Arc<RwLock<HashMap<ShowingId, Arc<Mutex<SeatMap>>>>>,
}

impl InMemorySeatStore {
    /// Creates a new empty in-memory seat store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of seats the store has a record for.
    pub async fn recorded_seats(&self, showing: ShowingId) -> usize {
        match self.showings.read().await.get(&showing) {
            Some(shard) => shard.lock().await.len(),
            None => 0,
        }
    }

    /// Clears all recorded seat state.
    pub async fn clear(&self) {
        self.showings.write().await.clear();
    }

    async fn shard(&self, showing: ShowingId) -> Arc<Mutex<SeatMap>> {
        if let Some(shard) = self.showings.read().await.get(&showing) {
            return shard.clone();
        }
        let mut showings = self.showings.write().await;
        showings.entry(showing).or_default().clone()
    }
}

#[async_trait]
impl SeatStore for InMemorySeatStore {
    async fn transition(
        &self,
        showing: ShowingId,
        transitions: Vec<SeatTransition>,
    ) -> Result<TransitionOutcome> {
        validate_transition_batch(&transitions)?;

        let shard = self.shard(showing).await;
        let mut seats = shard.lock().await;

        // Evaluate every predicate at this single serialization point.
        let mut conflicts: Vec<SeatLabel> = transitions
            .iter()
            .filter(|t| {
                let current = seats.get(&t.seat).copied().unwrap_or_default();
                !t.expect.matches(&current)
            })
            .map(|t| t.seat.clone())
            .collect();

        if !conflicts.is_empty() {
            conflicts.sort();
            return Ok(TransitionOutcome::Rejected { conflicts });
        }

        for transition in transitions {
            seats.insert(transition.seat, transition.to);
        }

        Ok(TransitionOutcome::Applied)
    }

    async fn seat_states(&self, showing: ShowingId) -> Result<BTreeMap<SeatLabel, SeatState>> {
        let Some(shard) = self.showings.read().await.get(&showing).cloned() else {
            return Ok(BTreeMap::new());
        };
        let seats = shard.lock().await;
        Ok(seats.iter().map(|(k, v)| (k.clone(), *v)).collect())
    }

    async fn seat_state(&self, showing: ShowingId, seat: &SeatLabel) -> Result<Option<SeatState>> {
        let Some(shard) = self.showings.read().await.get(&showing).cloned() else {
            return Ok(None);
        };
        let seats = shard.lock().await;
        Ok(seats.get(seat).copied())
    }
}
