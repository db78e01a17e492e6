//! Booking error taxonomy.

use common::{OrderId, SeatLabel, ShowingId};
use seat_store::SeatStoreError;
use thiserror::Error;

use crate::order::OrderStatus;

/// Errors that can occur during booking operations.
///
/// Contention ([`BookingError::SeatsUnavailable`]) and expiry
/// ([`BookingError::OrderExpired`]) are expected, recoverable outcomes; the
/// engine surfaces them and never retries internally. A store failure is
/// fatal to the call and is never reported as contention.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Malformed request, rejected before any store access.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The showing is not in the catalog.
    #[error("unknown showing: {0}")]
    UnknownShowing(ShowingId),

    /// Requested seats that do not exist in the hall layout.
    #[error("unknown seats for showing {showing}: [{}]", format_seats(.seats))]
    UnknownSeat {
        showing: ShowingId,
        seats: Vec<SeatLabel>,
    },

    /// At least one requested seat was not free; lists exactly the
    /// requested seats that were unavailable.
    #[error("seats unavailable: [{}]", format_seats(.conflicts))]
    SeatsUnavailable { conflicts: Vec<SeatLabel> },

    /// No order with this id.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order's hold deadline has passed.
    #[error("order expired: {0}")]
    OrderExpired(OrderId),

    /// Illegal order lifecycle transition.
    #[error("invalid state transition: cannot {action} from {status} status")]
    InvalidState {
        status: OrderStatus,
        action: &'static str,
    },

    /// An order with this id already exists in the ledger.
    #[error("order already recorded: {0}")]
    DuplicateOrder(OrderId),

    /// The seat store itself failed; distinct from any contention outcome.
    #[error("seat store unavailable: {0}")]
    Store(#[from] SeatStoreError),
}

fn format_seats(seats: &[SeatLabel]) -> String {
    seats
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;
