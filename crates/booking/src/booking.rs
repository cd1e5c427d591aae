//! Booking record and its state machine.

use chrono::{DateTime, Utc};
use common::{BookingId, CustomerId, Money, SeatId, SessionId, TripId};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};

/// The status of a booking in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──confirm──► Confirmed ──trip completes──► Completed
///    │                     │
///    └─cancel / payment────┴──cancel (before deadline)──► Cancelled
///      failure / expiry
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Seats are committed, payment has not been reported.
    #[default]
    Pending,

    /// Payment succeeded.
    Confirmed,

    /// Released back to inventory (terminal state).
    Cancelled,

    /// The trip ran (terminal state).
    Completed,
}

impl BookingStatus {
    pub fn can_confirm(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn can_complete(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traveller details for one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub seat_id: SeatId,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result reported by the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
}

/// A set of committed seats on one trip, with its payment and cancellation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub trip_id: TripId,
    pub seat_ids: Vec<SeatId>,
    pub status: BookingStatus,
    pub total_amount: Money,
    pub session_id: Option<SessionId>,
    pub customer_id: Option<CustomerId>,
    pub passengers: Vec<Passenger>,
    /// Human-readable code, assigned by ticketing on confirmation.
    pub booking_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub refund_amount: Option<Money>,
    /// Bumped by the repository on every stored change.
    pub version: u64,
}

impl Booking {
    /// Creates a pending booking for seats that were just committed.
    pub fn pending(
        id: BookingId,
        trip_id: TripId,
        seat_ids: Vec<SeatId>,
        total_amount: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            trip_id,
            seat_ids,
            status: BookingStatus::Pending,
            total_amount,
            session_id: None,
            customer_id: None,
            passengers: Vec::new(),
            booking_code: None,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            refund_amount: None,
            version: 0,
        }
    }

    /// Transition: Pending → Confirmed.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure(self.status.can_confirm(), "confirm")?;
        self.status = BookingStatus::Confirmed;
        self.confirmed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Transition: Pending → Cancelled after the payment was declined.
    pub fn fail_payment(&mut self, now: DateTime<Utc>, reason: impl Into<String>) -> Result<()> {
        self.ensure(self.status.can_confirm(), "fail payment")?;
        self.cancel(now, reason, Money::zero())
    }

    /// Transition: Pending | Confirmed → Cancelled.
    pub fn cancel(&mut self, now: DateTime<Utc>, reason: impl Into<String>, refund: Money) -> Result<()> {
        self.ensure(self.status.can_cancel(), "cancel")?;
        self.status = BookingStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancellation_reason = Some(reason.into());
        self.refund_amount = Some(refund);
        self.updated_at = now;
        Ok(())
    }

    /// Transition: Confirmed → Completed.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure(self.status.can_complete(), "complete")?;
        self.status = BookingStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(BookingError::InvalidStateTransition {
                current: self.status,
                action,
            })
        }
    }
}
