use thiserror::Error;

use common::ShowingId;

/// Errors that can occur when interacting with the seat store.
///
/// A rejected transition is not an error; predicate failures are reported
/// through [`crate::TransitionOutcome::Rejected`]. These variants cover
/// infrastructure failure only, and callers must never interpret them as
/// seat contention.
#[derive(Debug, Error)]
pub enum SeatStoreError {
    /// The transition batch itself was malformed (empty, or the same seat
    /// named twice).
    #[error("invalid transition batch: {0}")]
    InvalidBatch(String),

    /// A persisted seat record could not be interpreted.
    #[error("corrupt seat record for {seat} in showing {showing}: {message}")]
    InvalidRow {
        showing: ShowingId,
        seat: String,
        message: String,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for seat store operations.
pub type Result<T> = std::result::Result<T, SeatStoreError>;
