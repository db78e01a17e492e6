//! Booking core for the cinema back end.
//!
//! This crate provides the reservation consistency engine:
//! - `ReservationEngine` turning reserve/confirm/cancel requests into
//!   atomic multi-seat transitions
//! - `OrderLedger` recording order lifecycles behind a status machine
//! - `HoldReaper` reclaiming lapsed holds
//! - the `Catalog` collaborator boundary supplying seat universes

pub mod catalog;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod order;
pub mod reaper;

pub use catalog::{Catalog, HallLayout, InMemoryCatalog};
pub use engine::ReservationEngine;
pub use error::{BookingError, Result};
pub use ledger::{InMemoryOrderLedger, OrderLedger};
pub use order::{Order, OrderStatus};
pub use reaper::HoldReaper;
