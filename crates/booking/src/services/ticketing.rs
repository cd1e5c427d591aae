//! Ticket issuing service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::{BookingId, SeatId};
use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::error::{BookingError, Result};

/// One boarding pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub seat_id: SeatId,
    pub passenger_name: Option<String>,
    /// Payload rendered into the QR code.
    pub code: String,
}

/// Everything ticketing produced for a confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketBundle {
    pub booking_code: String,
    pub tickets: Vec<Ticket>,
}

/// Trait for issuing tickets to confirmed bookings.
#[async_trait]
pub trait TicketIssuer: Send + Sync {
    async fn issue(&self, booking: &Booking) -> Result<TicketBundle>;
}

#[derive(Debug, Default)]
struct InMemoryTicketState {
    issued: HashMap<BookingId, TicketBundle>,
    next_code: u32,
    fail_on_issue: bool,
}

/// In-memory ticket issuer for testing and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTicketIssuer {
    state: Arc<RwLock<InMemoryTicketState>>,
}

impl InMemoryTicketIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the issuer to fail on subsequent calls.
    pub fn set_fail_on_issue(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_issue = fail;
    }

    pub fn issued_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .issued
            .len()
    }

    pub fn bundle_for(&self, booking_id: BookingId) -> Option<TicketBundle> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .issued
            .get(&booking_id)
            .cloned()
    }
}

#[async_trait]
impl TicketIssuer for InMemoryTicketIssuer {
    async fn issue(&self, booking: &Booking) -> Result<TicketBundle> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_issue {
            return Err(BookingError::Collaborator {
                service: "ticketing",
                reason: "ticket printer offline".to_string(),
            });
        }
        // Re-issuing returns the original bundle.
        if let Some(bundle) = state.issued.get(&booking.id) {
            return Ok(bundle.clone());
        }

        state.next_code += 1;
        let booking_code = format!("BK-{:06}", state.next_code);
        let tickets = booking
            .seat_ids
            .iter()
            .map(|seat_id| Ticket {
                seat_id: seat_id.clone(),
                passenger_name: booking
                    .passengers
                    .iter()
                    .find(|p| &p.seat_id == seat_id)
                    .map(|p| p.name.clone()),
                code: format!("{booking_code}:{seat_id}"),
            })
            .collect();

        let bundle = TicketBundle {
            booking_code,
            tickets,
        };
        state.issued.insert(booking.id, bundle.clone());
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::{Money, TripId};

    use super::*;
    use crate::booking::Passenger;

    fn booking() -> Booking {
        let mut booking = Booking::pending(
            BookingId::new(),
            TripId::new(),
            vec![SeatId::from("1A"), SeatId::from("1B")],
            Money::from_cents(3000),
            Utc::now(),
        );
        booking.passengers = vec![Passenger {
            name: "Ana".to_string(),
            seat_id: SeatId::from("1B"),
            phone: None,
            email: None,
        }];
        booking
    }

    #[tokio::test]
    async fn test_issue_tickets() {
        let issuer = InMemoryTicketIssuer::new();
        let booking = booking();

        let bundle = issuer.issue(&booking).await.unwrap();
        assert_eq!(bundle.booking_code, "BK-000001");
        assert_eq!(bundle.tickets.len(), 2);
        assert_eq!(bundle.tickets[0].passenger_name, None);
        assert_eq!(bundle.tickets[1].passenger_name.as_deref(), Some("Ana"));

        let again = issuer.issue(&booking).await.unwrap();
        assert_eq!(again, bundle);
        assert_eq!(issuer.issued_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_on_issue() {
        let issuer = InMemoryTicketIssuer::new();
        issuer.set_fail_on_issue(true);
        let err = issuer.issue(&booking()).await.unwrap_err();
        assert!(matches!(err, BookingError::Collaborator { service: "ticketing", .. }));
        assert_eq!(issuer.issued_count(), 0);
    }
}
