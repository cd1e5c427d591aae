//! Booking events handed to the notification collaborator.

use common::{BookingId, Money, SeatId, TripId};
use serde::{Deserialize, Serialize};

use crate::booking::Booking;

/// Something that happened to a booking, published after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    Created {
        booking_id: BookingId,
        trip_id: TripId,
        seat_ids: Vec<SeatId>,
        total_amount: Money,
    },
    Confirmed {
        booking_id: BookingId,
        booking_code: Option<String>,
    },
    Cancelled {
        booking_id: BookingId,
        reason: String,
        refund_amount: Money,
    },
    Expired {
        booking_id: BookingId,
    },
    Completed {
        booking_id: BookingId,
    },
}

impl BookingEvent {
    pub fn created(booking: &Booking) -> Self {
        BookingEvent::Created {
            booking_id: booking.id,
            trip_id: booking.trip_id,
            seat_ids: booking.seat_ids.clone(),
            total_amount: booking.total_amount,
        }
    }

    pub fn confirmed(booking: &Booking) -> Self {
        BookingEvent::Confirmed {
            booking_id: booking.id,
            booking_code: booking.booking_code.clone(),
        }
    }

    pub fn cancelled(booking: &Booking) -> Self {
        BookingEvent::Cancelled {
            booking_id: booking.id,
            reason: booking.cancellation_reason.clone().unwrap_or_default(),
            refund_amount: booking.refund_amount.unwrap_or_default(),
        }
    }

    pub fn booking_id(&self) -> BookingId {
        match self {
            BookingEvent::Created { booking_id, .. }
            | BookingEvent::Confirmed { booking_id, .. }
            | BookingEvent::Cancelled { booking_id, .. }
            | BookingEvent::Expired { booking_id }
            | BookingEvent::Completed { booking_id } => *booking_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            BookingEvent::Created { .. } => "BookingCreated",
            BookingEvent::Confirmed { .. } => "BookingConfirmed",
            BookingEvent::Cancelled { .. } => "BookingCancelled",
            BookingEvent::Expired { .. } => "BookingExpired",
            BookingEvent::Completed { .. } => "BookingCompleted",
        }
    }
}
