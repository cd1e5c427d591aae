//! Booking error types.

use common::{BookingId, SeatId, TripId};
use inventory::InventoryError;
use thiserror::Error;

use crate::booking::BookingStatus;
use crate::trip::TripStatus;

/// Errors that can occur when storing or loading bookings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The booking changed since it was read.
    #[error(
        "Concurrency conflict for booking {booking_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        booking_id: BookingId,
        expected: u64,
        actual: u64,
    },

    /// The booking does not exist in the store.
    #[error("Booking not stored: {0}")]
    NotFound(BookingId),

    /// A booking with this id already exists.
    #[error("Duplicate booking: {0}")]
    Duplicate(BookingId),

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Errors that can occur during booking operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// A seat-level conflict or validation failure from the inventory.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// More seats requested than the trip has left.
    #[error("Capacity exceeded: requested {requested}, available {available}")]
    CapacityExceeded { requested: usize, available: usize },

    /// The catalog has no such trip.
    #[error("Trip not found: {0}")]
    TripNotFound(TripId),

    /// The trip is not open for holds or bookings.
    #[error("Trip {trip_id} is not bookable in {status} state")]
    TripNotBookable { trip_id: TripId, status: TripStatus },

    /// Too close to departure to cancel.
    #[error(
        "Cancellation window passed: departure in {hours_before_departure}h, deadline is {deadline_hours}h before departure"
    )]
    CancellationWindowPassed {
        hours_before_departure: i64,
        deadline_hours: i64,
    },

    /// No booking with this id.
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// The booking's status does not allow the action.
    #[error("Invalid state transition: cannot {action} a {current} booking")]
    InvalidStateTransition {
        current: BookingStatus,
        action: &'static str,
    },

    /// The booking stayed pending past its payment window and was cancelled.
    #[error("Booking {0} expired before payment")]
    BookingExpired(BookingId),

    /// The caller's role does not permit the action.
    #[error("Not authorized to {action}")]
    NotAuthorized { action: &'static str },

    /// The request is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Booking storage failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// An external collaborator failed before the commit point.
    #[error("{service} service error: {reason}")]
    Collaborator {
        service: &'static str,
        reason: String,
    },
}

impl BookingError {
    /// Stable machine-readable code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::Inventory(err) => err.code(),
            BookingError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            BookingError::TripNotFound(_) => "TRIP_NOT_FOUND",
            BookingError::TripNotBookable { .. } => "TRIP_NOT_BOOKABLE",
            BookingError::CancellationWindowPassed { .. } => "CANCELLATION_WINDOW_PASSED",
            BookingError::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            BookingError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            BookingError::BookingExpired(_) => "BOOKING_EXPIRED",
            BookingError::NotAuthorized { .. } => "NOT_AUTHORIZED",
            BookingError::InvalidRequest(_) => "INVALID_REQUEST",
            BookingError::Repository(RepositoryError::ConcurrencyConflict { .. }) => {
                "CONCURRENCY_CONFLICT"
            }
            BookingError::Repository(_) | BookingError::Collaborator { .. } => "INTERNAL",
        }
    }

    /// The contested seat, for seat-level errors.
    pub fn seat_id(&self) -> Option<&SeatId> {
        match self {
            BookingError::Inventory(err) => err.seat_id(),
            _ => None,
        }
    }
}

/// Convenience type alias for booking results.
pub type Result<T> = std::result::Result<T, BookingError>;
