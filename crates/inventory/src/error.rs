//! Inventory error types.

use common::{SeatId, TripId};
use thiserror::Error;

/// Errors returned by seat inventory operations.
///
/// Every failed operation leaves the inventory exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The seat id is not part of the trip's seat layout.
    #[error("Unknown seat: {0}")]
    UnknownSeat(SeatId),

    /// The seat is committed to a booking.
    #[error("Seat already booked: {0}")]
    SeatAlreadyBooked(SeatId),

    /// The seat is held by another session whose hold has not expired.
    #[error("Seat locked by another session: {0}")]
    SeatLockedByOther(SeatId),

    /// The request named no seats.
    #[error("No seats requested")]
    EmptySelection,

    /// The hold TTL must be positive.
    #[error("Invalid hold TTL: {seconds}s")]
    InvalidTtl { seconds: i64 },

    /// No inventory has been opened for the trip.
    #[error("No inventory registered for trip {0}")]
    TripNotRegistered(TripId),
}

impl InventoryError {
    /// Stable machine-readable code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            InventoryError::UnknownSeat(_) => "UNKNOWN_SEAT",
            InventoryError::SeatAlreadyBooked(_) => "SEAT_ALREADY_BOOKED",
            InventoryError::SeatLockedByOther(_) => "SEAT_LOCKED_BY_OTHER",
            InventoryError::EmptySelection | InventoryError::InvalidTtl { .. } => "INVALID_REQUEST",
            InventoryError::TripNotRegistered(_) => "TRIP_NOT_FOUND",
        }
    }

    /// The seat this error is about, if any.
    pub fn seat_id(&self) -> Option<&SeatId> {
        match self {
            InventoryError::UnknownSeat(seat)
            | InventoryError::SeatAlreadyBooked(seat)
            | InventoryError::SeatLockedByOther(seat) => Some(seat),
            _ => None,
        }
    }

    /// True for conflicts a caller resolves by picking other seats.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            InventoryError::SeatAlreadyBooked(_) | InventoryError::SeatLockedByOther(_)
        )
    }
}

/// Error returned by `SeatInventory::place_hold`.
pub type HoldError = InventoryError;

/// Error returned by `SeatInventory::commit_seats`.
pub type CommitError = InventoryError;

/// Convenience type alias for inventory results.
pub type Result<T> = std::result::Result<T, InventoryError>;
