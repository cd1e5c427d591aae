//! Cancellation, refund and payment-window rules.

use chrono::{DateTime, Duration, Utc};
use common::Money;

use crate::booking::{Booking, BookingStatus};
use crate::error::{BookingError, Result};
use crate::trip::Trip;

/// Time-based rules applied by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// No cancellations this close to departure, unless the trip overrides it.
    pub cancellation_deadline: Duration,
    /// Cancelling at least this long before departure refunds everything.
    pub full_refund_before: Duration,
    /// Refund share between the full-refund point and the deadline.
    pub partial_refund_percent: u8,
    /// How long a booking may stay pending before it is auto-cancelled.
    pub pending_ttl: Duration,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            cancellation_deadline: Duration::hours(24),
            full_refund_before: Duration::hours(72),
            partial_refund_percent: 50,
            pending_ttl: Duration::minutes(15),
        }
    }
}

impl BookingPolicy {
    /// Effective deadline for a trip.
    pub fn deadline_for(&self, trip: &Trip) -> Duration {
        trip.cancellation_deadline_hours
            .map(|h| Duration::hours(i64::from(h)))
            .unwrap_or(self.cancellation_deadline)
    }

    /// Fails with `CancellationWindowPassed` inside the no-cancel window.
    pub fn check_cancellation_window(&self, trip: &Trip, now: DateTime<Utc>) -> Result<()> {
        let remaining = trip.departure_at - now;
        let deadline = self.deadline_for(trip);
        if remaining < deadline {
            return Err(BookingError::CancellationWindowPassed {
                hours_before_departure: remaining.num_hours(),
                deadline_hours: deadline.num_hours(),
            });
        }
        Ok(())
    }

    /// Amount returned to the customer on cancellation.
    ///
    /// Pending bookings were never paid, so nothing is refunded.
    pub fn refund_for(&self, booking: &Booking, trip: &Trip, now: DateTime<Utc>) -> Money {
        if booking.status != BookingStatus::Confirmed {
            return Money::zero();
        }
        if trip.departure_at - now >= self.full_refund_before {
            booking.total_amount
        } else {
            booking.total_amount.percent(self.partial_refund_percent)
        }
    }

    /// True once a pending booking has outlived its payment window.
    pub fn is_pending_stale(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        booking.status == BookingStatus::Pending && now - booking.created_at >= self.pending_ttl
    }
}
