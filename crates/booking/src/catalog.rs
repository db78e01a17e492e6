//! Catalog collaborator boundary.
//!
//! The engine only needs one thing from the catalog: the valid seat-label
//! universe of a showing. Movie, cinema and hall management live outside
//! the booking core.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{SeatLabel, ShowingId};

use crate::error::{BookingError, Result};

/// Trait for catalog implementations.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns the seat labels that exist for a showing's hall.
    ///
    /// Fails with `UnknownShowing` for showings the catalog has never seen.
    async fn seat_labels(&self, showing: ShowingId) -> Result<BTreeSet<SeatLabel>>;
}

/// A rectangular hall layout generating row-and-letter seat labels.
///
/// Rows are numbered from 1; seats within a row are lettered from `A`.
/// A 2x3 layout yields `1A 1B 1C 2A 2B 2C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HallLayout {
    rows: u32,
    seats_per_row: u8,
}

impl HallLayout {
    const SEAT_LETTERS: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Creates a layout; `seats_per_row` is capped at 26 (one letter each).
    pub fn new(rows: u32, seats_per_row: u8) -> Result<Self> {
        if rows == 0 || seats_per_row == 0 {
            return Err(BookingError::InvalidRequest {
                reason: "hall layout must have at least one row and one seat".to_string(),
            });
        }
        if seats_per_row as usize > Self::SEAT_LETTERS.len() {
            return Err(BookingError::InvalidRequest {
                reason: format!("at most 26 seats per row, got {seats_per_row}"),
            });
        }
        Ok(Self {
            rows,
            seats_per_row,
        })
    }

    /// Generates every seat label of the layout.
    pub fn labels(&self) -> BTreeSet<SeatLabel> {
        let mut labels = BTreeSet::new();
        for row in 1..=self.rows {
            for seat in 0..self.seats_per_row as usize {
                let letter = Self::SEAT_LETTERS[seat] as char;
                labels.insert(SeatLabel::new(format!("{row}{letter}")));
            }
        }
        labels
    }
}

/// In-memory catalog implementation.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    showings: Arc<RwLock<HashMap<ShowingId, BTreeSet<SeatLabel>>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a showing with an explicit seat universe.
    pub async fn register_showing(
        &self,
        showing: ShowingId,
        seats: impl IntoIterator<Item = SeatLabel>,
    ) {
        let mut showings = self.showings.write().await;
        showings.insert(showing, seats.into_iter().collect());
    }

    /// Registers a showing with the seats of a hall layout.
    pub async fn register_with_layout(&self, showing: ShowingId, layout: &HallLayout) {
        self.register_showing(showing, layout.labels()).await;
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn seat_labels(&self, showing: ShowingId) -> Result<BTreeSet<SeatLabel>> {
        self.showings
            .read()
            .await
            .get(&showing)
            .cloned()
            .ok_or(BookingError::UnknownShowing(showing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_generates_row_letter_labels() {
        let layout = HallLayout::new(2, 3).unwrap();
        let labels = layout.labels();
        assert_eq!(labels.len(), 6);
        assert!(labels.contains(&SeatLabel::new("1A")));
        assert!(labels.contains(&SeatLabel::new("2C")));
        assert!(!labels.contains(&SeatLabel::new("3A")));
    }

    #[test]
    fn degenerate_layouts_are_rejected() {
        assert!(HallLayout::new(0, 5).is_err());
        assert!(HallLayout::new(5, 0).is_err());
        assert!(HallLayout::new(5, 27).is_err());
    }

    #[tokio::test]
    async fn registered_showing_exposes_its_universe() {
        let catalog = InMemoryCatalog::new();
        let showing = ShowingId::new();
        let layout = HallLayout::new(10, 10).unwrap();

        catalog.register_with_layout(showing, &layout).await;

        let labels = catalog.seat_labels(showing).await.unwrap();
        assert_eq!(labels.len(), 100);
        assert!(labels.contains(&SeatLabel::new("10J")));
    }

    #[tokio::test]
    async fn unknown_showing_is_an_error() {
        let catalog = InMemoryCatalog::new();
        let result = catalog.seat_labels(ShowingId::new()).await;
        assert!(matches!(result, Err(BookingError::UnknownShowing(_))));
    }
}
