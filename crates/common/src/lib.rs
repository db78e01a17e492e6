//! Shared identifier types used across the booking system.

pub mod types;

pub use types::{OrderId, SeatLabel, ShowingId, UserId};
