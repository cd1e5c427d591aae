//! Seat inventory core.
//!
//! Each trip's seats are owned by one [`SeatInventory`]. It is the only
//! place seat state changes, and it guarantees that no seat is committed to
//! two bookings and that a live hold is never shown as free to another
//! session.
//!
//! Components, leaf-first:
//! - [`SeatMap`]: valid seat ids and capacity
//! - [`ExpiryPolicy`]: when a hold stops counting
//! - [`HoldLedger`]: session-scoped soft holds
//! - [`SeatInventory`]: holds + committed seats behind one lock per trip
//! - [`InventoryRegistry`]: one inventory per trip id

pub mod error;
pub mod expiry;
pub mod ledger;
pub mod registry;
pub mod seat_inventory;
pub mod seat_map;

pub use error::{CommitError, HoldError, InventoryError, Result};
pub use expiry::ExpiryPolicy;
pub use ledger::{Hold, HoldLedger};
pub use registry::InventoryRegistry;
pub use seat_inventory::{HoldToken, InventorySnapshot, SeatInventory, SeatState};
pub use seat_map::SeatMap;
