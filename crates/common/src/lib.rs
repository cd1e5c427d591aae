//! Shared types for the seat booking core.
//!
//! Identifiers, money and the injectable clock used by the inventory,
//! booking and API crates.

pub mod clock;
pub mod money;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use money::Money;
pub use types::{BookingId, CustomerId, SeatId, SessionId, TripId};
