//! Booking orchestrator coordinating seat inventory with the booking lifecycle.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Duration;
use common::{BookingId, Clock, Money, SeatId, SessionId, TripId};
use inventory::{HoldToken, InventoryError, InventoryRegistry, SeatInventory, SeatState};
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::booking::{Booking, BookingStatus, Passenger, PaymentOutcome};
use crate::error::{BookingError, RepositoryError, Result};
use crate::events::BookingEvent;
use crate::policy::BookingPolicy;
use crate::repository::BookingRepository;
use crate::services::{
    FlatFarePricing, InMemoryNotifier, InMemoryTicketIssuer, Notifier, PricingRequest,
    PricingService, TicketIssuer,
};
use crate::trip::{Trip, TripCatalog, TripStatus};

const PAYMENT_FAILED_REASON: &str = "payment failed";
const EXPIRED_REASON: &str = "payment window expired";

/// Input for [`BookingOrchestrator::create_booking`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBooking {
    pub trip_id: TripId,
    pub seat_ids: Vec<SeatId>,
    /// Session whose holds back the seats, if the caller held them first.
    pub session_id: Option<SessionId>,
    pub passengers: Vec<Passenger>,
    pub pricing: PricingRequest,
}

impl CreateBooking {
    pub fn new(trip_id: TripId, seat_ids: Vec<SeatId>) -> Self {
        Self {
            trip_id,
            seat_ids,
            session_id: None,
            passengers: Vec::new(),
            pricing: PricingRequest::default(),
        }
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_passengers(mut self, passengers: Vec<Passenger>) -> Self {
        self.passengers = passengers;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingRequest) -> Self {
        self.pricing = pricing;
        self
    }
}

/// Seat-by-seat view of one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripAvailability {
    pub trip_id: TripId,
    pub capacity: usize,
    pub available: usize,
    pub seats: BTreeMap<SeatId, SeatState>,
}

/// Sequences seat inventory operations with booking records and the
/// external collaborators.
///
/// Inventory calls are synchronous and hold a trip lock only for their own
/// duration. Every repository, ticketing and notification call happens
/// after that lock is released.
pub struct BookingOrchestrator {
    inventories: InventoryRegistry,
    catalog: Arc<dyn TripCatalog>,
    bookings: Arc<dyn BookingRepository>,
    pricing: Arc<dyn PricingService>,
    ticketing: Arc<dyn TicketIssuer>,
    notifier: Arc<dyn Notifier>,
    policy: BookingPolicy,
    clock: Arc<dyn Clock>,
}

impl BookingOrchestrator {
    /// Creates an orchestrator with flat-fare pricing and in-memory
    /// ticketing and notification.
    pub fn new(
        inventories: InventoryRegistry,
        catalog: Arc<dyn TripCatalog>,
        bookings: Arc<dyn BookingRepository>,
        policy: BookingPolicy,
    ) -> Self {
        let clock = inventories.clock().clone();
        Self {
            inventories,
            catalog,
            bookings,
            pricing: Arc::new(FlatFarePricing::new()),
            ticketing: Arc::new(InMemoryTicketIssuer::new()),
            notifier: Arc::new(InMemoryNotifier::new()),
            policy,
            clock,
        }
    }

    pub fn with_pricing(mut self, pricing: Arc<dyn PricingService>) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_ticketing(mut self, ticketing: Arc<dyn TicketIssuer>) -> Self {
        self.ticketing = ticketing;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    pub fn inventories(&self) -> &InventoryRegistry {
        &self.inventories
    }

    /// Current state of every seat on a trip.
    #[tracing::instrument(skip(self))]
    pub async fn availability(&self, trip_id: TripId) -> Result<TripAvailability> {
        let trip = self.load_trip(trip_id).await?;
        let inventory = self.inventory_for(&trip);
        let seats = inventory.query_availability();
        let available = seats.values().filter(|s| s.is_free()).count();
        Ok(TripAvailability {
            trip_id,
            capacity: inventory.capacity(),
            available,
            seats,
        })
    }

    /// Places a hold on behalf of a browsing session.
    #[tracing::instrument(skip(self, seat_ids), fields(seats = seat_ids.len()))]
    pub async fn hold_seats(
        &self,
        trip_id: TripId,
        seat_ids: &[SeatId],
        session_id: &SessionId,
        ttl: Duration,
    ) -> Result<HoldToken> {
        let trip = self.bookable_trip(trip_id).await?;
        let token = self
            .inventory_for(&trip)
            .place_hold(seat_ids, session_id, ttl)?;
        Ok(token)
    }

    /// Drops every hold of a session on a trip.
    #[tracing::instrument(skip(self))]
    pub async fn release_holds(&self, trip_id: TripId, session_id: &SessionId) -> Result<usize> {
        self.load_trip(trip_id).await?;
        match self.inventories.get(trip_id) {
            Ok(inventory) => Ok(inventory.release_hold(session_id)),
            // Never opened, so nothing was ever held.
            Err(InventoryError::TripNotRegistered(_)) => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    /// Commits seats and records a pending booking.
    ///
    /// Seat conflicts are returned as-is and leave no booking behind. If the
    /// booking cannot be stored, the committed seats are released again.
    #[tracing::instrument(skip(self, request), fields(trip_id = %request.trip_id, seats = request.seat_ids.len()))]
    pub async fn create_booking(&self, actor: Actor, request: CreateBooking) -> Result<Booking> {
        let started = std::time::Instant::now();

        let trip = self.bookable_trip(request.trip_id).await?;
        self.expire_stale_for_trip(trip.id).await?;

        let seats = dedupe(&request.seat_ids);
        if seats.is_empty() {
            return Err(InventoryError::EmptySelection.into());
        }
        let inventory = self.inventory_for(&trip);
        let available = inventory.available_for(request.session_id.as_ref());
        if seats.len() > available {
            return Err(BookingError::CapacityExceeded {
                requested: seats.len(),
                available,
            });
        }
        validate_passengers(&seats, &request.passengers)?;

        let total = self
            .pricing
            .quote(&trip, seats.len(), &request.pricing)
            .await?;

        let booking_id = BookingId::new();
        inventory.commit_seats(&seats, booking_id, request.session_id.as_ref())?;

        let mut booking = Booking::pending(booking_id, trip.id, seats, total, self.clock.now());
        booking.session_id = request.session_id;
        booking.customer_id = actor.customer_id();
        booking.passengers = request.passengers;

        let booking = match self.bookings.insert(&booking).await {
            Ok(stored) => stored,
            Err(err) => {
                inventory.release_committed(&booking.seat_ids, booking_id);
                tracing::error!(%booking_id, error = %err, "failed to store booking, seats released");
                return Err(err.into());
            }
        };

        metrics::counter!("bookings_created_total").increment(1);
        metrics::histogram!("booking_create_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(
            %booking_id,
            %actor,
            total = %booking.total_amount,
            "booking created"
        );

        self.publish(BookingEvent::created(&booking)).await;
        Ok(booking)
    }

    /// Applies the payment outcome to a pending booking.
    ///
    /// A failed payment cancels the booking and frees its seats; the
    /// returned booking is then `Cancelled`. A booking past its payment
    /// window is expired and the call fails with `BookingExpired`.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_booking(
        &self,
        actor: Actor,
        booking_id: BookingId,
        outcome: PaymentOutcome,
    ) -> Result<Booking> {
        let booking = self.load_booking(booking_id).await?;
        authorize(actor.may_manage(&booking), "confirm booking")?;

        let now = self.clock.now();
        if self.policy.is_pending_stale(&booking, now) {
            self.expire(booking).await?;
            return Err(BookingError::BookingExpired(booking_id));
        }

        match outcome {
            PaymentOutcome::Succeeded => self.confirm_paid(booking).await,
            PaymentOutcome::Failed => {
                let mut updated = booking;
                updated.fail_payment(now, PAYMENT_FAILED_REASON)?;
                let updated = self.bookings.update(&updated).await?;
                self.release_seats(&updated);

                metrics::counter!("bookings_cancelled_total", "cause" => "payment_failed")
                    .increment(1);
                tracing::info!(%booking_id, "payment failed, booking cancelled");

                self.publish(BookingEvent::cancelled(&updated)).await;
                Ok(updated)
            }
        }
    }

    /// Cancels a booking and returns its seats to the pool.
    ///
    /// Inside the no-cancel window this fails and changes nothing, unless
    /// the caller is an admin.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_booking(
        &self,
        actor: Actor,
        booking_id: BookingId,
        reason: &str,
    ) -> Result<Booking> {
        let booking = self.load_booking(booking_id).await?;
        authorize(actor.may_manage(&booking), "cancel booking")?;

        if !booking.status.can_cancel() {
            return Err(BookingError::InvalidStateTransition {
                current: booking.status,
                action: "cancel",
            });
        }

        let trip = self.load_trip(booking.trip_id).await?;
        let now = self.clock.now();
        if actor.can_override_deadline() {
            if self.policy.check_cancellation_window(&trip, now).is_err() {
                tracing::info!(%booking_id, %actor, "cancellation deadline overridden");
            }
        } else {
            self.policy.check_cancellation_window(&trip, now)?;
        }

        let refund = self.policy.refund_for(&booking, &trip, now);
        let mut updated = booking;
        updated.cancel(now, reason, refund)?;
        let updated = self.bookings.update(&updated).await?;
        self.release_seats(&updated);

        metrics::counter!("bookings_cancelled_total", "cause" => "requested").increment(1);
        tracing::info!(%booking_id, %actor, refund = %refund, "booking cancelled");

        self.publish(BookingEvent::cancelled(&updated)).await;
        Ok(updated)
    }

    /// Marks a confirmed booking as travelled. Staff only.
    #[tracing::instrument(skip(self))]
    pub async fn complete_booking(&self, actor: Actor, booking_id: BookingId) -> Result<Booking> {
        authorize(actor.is_staff(), "complete booking")?;
        let booking = self.load_booking(booking_id).await?;
        self.complete(booking).await
    }

    /// Closes a trip and completes all of its confirmed bookings. Staff only.
    ///
    /// Returns the bookings that were completed.
    #[tracing::instrument(skip(self))]
    pub async fn complete_trip(&self, actor: Actor, trip_id: TripId) -> Result<Vec<Booking>> {
        authorize(actor.is_staff(), "complete trip")?;
        self.catalog.set_status(trip_id, TripStatus::Completed).await?;

        let mut completed = Vec::new();
        for booking in self.bookings.list_by_trip(trip_id).await? {
            if booking.status == BookingStatus::Confirmed {
                completed.push(self.complete(booking).await?);
            }
        }
        tracing::info!(%trip_id, completed = completed.len(), "trip completed");
        Ok(completed)
    }

    /// Cancels every pending booking that outlived its payment window.
    ///
    /// Bookings changed concurrently are skipped; they will be picked up on
    /// the next pass if they are still pending.
    #[tracing::instrument(skip(self))]
    pub async fn expire_stale_pending(&self) -> Result<Vec<Booking>> {
        let cutoff = self.clock.now() - self.policy.pending_ttl;
        let stale = self.bookings.list_pending_created_before(cutoff).await?;
        self.expire_all(stale).await
    }

    pub async fn get_booking(&self, actor: Actor, booking_id: BookingId) -> Result<Booking> {
        let booking = self.load_booking(booking_id).await?;
        authorize(actor.may_manage(&booking), "view booking")?;
        Ok(booking)
    }

    /// All bookings of a trip, oldest first. Staff only.
    pub async fn bookings_for_trip(&self, actor: Actor, trip_id: TripId) -> Result<Vec<Booking>> {
        authorize(actor.is_staff(), "list trip bookings")?;
        Ok(self.bookings.list_by_trip(trip_id).await?)
    }

    async fn confirm_paid(&self, booking: Booking) -> Result<Booking> {
        let booking_id = booking.id;
        let mut updated = booking;
        updated.confirm(self.clock.now())?;
        let mut updated = self.bookings.update(&updated).await?;

        metrics::counter!("bookings_confirmed_total").increment(1);
        tracing::info!(%booking_id, "booking confirmed");

        // The booking stays confirmed even if ticketing is down.
        match self.ticketing.issue(&updated).await {
            Ok(bundle) => {
                updated.booking_code = Some(bundle.booking_code);
                match self.bookings.update(&updated).await {
                    Ok(stored) => updated = stored,
                    Err(err) => {
                        tracing::warn!(%booking_id, error = %err, "failed to store booking code");
                    }
                }
            }
            Err(err) => {
                tracing::warn!(%booking_id, error = %err, "ticket issuing failed");
            }
        }

        self.publish(BookingEvent::confirmed(&updated)).await;
        Ok(updated)
    }

    async fn complete(&self, booking: Booking) -> Result<Booking> {
        let booking_id = booking.id;
        let mut updated = booking;
        updated.complete(self.clock.now())?;
        let updated = self.bookings.update(&updated).await?;
        tracing::info!(%booking_id, "booking completed");
        self.publish(BookingEvent::Completed { booking_id }).await;
        Ok(updated)
    }

    async fn expire_stale_for_trip(&self, trip_id: TripId) -> Result<()> {
        let now = self.clock.now();
        let stale: Vec<Booking> = self
            .bookings
            .list_by_trip(trip_id)
            .await?
            .into_iter()
            .filter(|b| self.policy.is_pending_stale(b, now))
            .collect();
        self.expire_all(stale).await?;
        Ok(())
    }

    async fn expire_all(&self, stale: Vec<Booking>) -> Result<Vec<Booking>> {
        let mut expired = Vec::with_capacity(stale.len());
        for booking in stale {
            let booking_id = booking.id;
            match self.expire(booking).await {
                Ok(updated) => expired.push(updated),
                Err(BookingError::Repository(RepositoryError::ConcurrencyConflict { .. })) => {
                    tracing::debug!(%booking_id, "booking changed while expiring, skipped");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(expired)
    }

    async fn expire(&self, booking: Booking) -> Result<Booking> {
        let booking_id = booking.id;
        let mut updated = booking;
        updated.cancel(self.clock.now(), EXPIRED_REASON, Money::zero())?;
        let updated = self.bookings.update(&updated).await?;
        self.release_seats(&updated);

        metrics::counter!("bookings_expired_total").increment(1);
        metrics::counter!("bookings_cancelled_total", "cause" => "expired").increment(1);
        tracing::info!(%booking_id, trip_id = %updated.trip_id, "pending booking expired");

        self.publish(BookingEvent::Expired { booking_id }).await;
        Ok(updated)
    }

    fn release_seats(&self, booking: &Booking) {
        // An unopened trip has nothing committed.
        if let Ok(inventory) = self.inventories.get(booking.trip_id) {
            inventory.release_committed(&booking.seat_ids, booking.id);
        }
    }

    async fn publish(&self, event: BookingEvent) {
        if let Err(err) = self.notifier.notify(&event).await {
            tracing::warn!(
                booking_id = %event.booking_id(),
                event_type = event.event_type(),
                error = %err,
                "notification failed"
            );
        }
    }

    async fn load_trip(&self, trip_id: TripId) -> Result<Trip> {
        self.catalog
            .get(trip_id)
            .await?
            .ok_or(BookingError::TripNotFound(trip_id))
    }

    async fn bookable_trip(&self, trip_id: TripId) -> Result<Trip> {
        let trip = self.load_trip(trip_id).await?;
        if !trip.status.is_bookable() {
            return Err(BookingError::TripNotBookable {
                trip_id,
                status: trip.status,
            });
        }
        Ok(trip)
    }

    async fn load_booking(&self, booking_id: BookingId) -> Result<Booking> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))
    }

    fn inventory_for(&self, trip: &Trip) -> Arc<SeatInventory> {
        self.inventories.open(trip.id, trip.seat_map())
    }
}

fn authorize(allowed: bool, action: &'static str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(BookingError::NotAuthorized { action })
    }
}

/// Drops repeated seat ids, keeping request order.
fn dedupe(seat_ids: &[SeatId]) -> Vec<SeatId> {
    let mut seen = HashSet::with_capacity(seat_ids.len());
    seat_ids
        .iter()
        .filter(|s| seen.insert(*s))
        .cloned()
        .collect()
}

fn validate_passengers(seats: &[SeatId], passengers: &[Passenger]) -> Result<()> {
    let mut assigned = HashSet::with_capacity(passengers.len());
    for passenger in passengers {
        if !seats.contains(&passenger.seat_id) {
            return Err(BookingError::InvalidRequest(format!(
                "passenger {} is assigned to seat {} which is not part of the booking",
                passenger.name, passenger.seat_id
            )));
        }
        if !assigned.insert(&passenger.seat_id) {
            return Err(BookingError::InvalidRequest(format!(
                "seat {} is assigned to more than one passenger",
                passenger.seat_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::{CustomerId, ManualClock};
    use inventory::ExpiryPolicy;

    use super::*;
    use crate::repository::InMemoryBookingRepository;
    use crate::trip::InMemoryTripCatalog;

    struct Fixture {
        orchestrator: BookingOrchestrator,
        clock: ManualClock,
        trip: Trip,
        notifier: InMemoryNotifier,
    }

    fn fixture() -> Fixture {
        let clock = ManualClock::new(Utc::now());
        let trip = Trip::new(
            TripId::new(),
            Money::from_cents(1500),
            clock.now() + Duration::hours(96),
            vec![SeatId::from("1A"), SeatId::from("1B"), SeatId::from("1C")],
        );
        let catalog = InMemoryTripCatalog::with_trips([trip.clone()]);
        let notifier = InMemoryNotifier::new();
        let orchestrator = BookingOrchestrator::new(
            InventoryRegistry::new(ExpiryPolicy::default(), Arc::new(clock.clone())),
            Arc::new(catalog),
            Arc::new(InMemoryBookingRepository::new()),
            BookingPolicy::default(),
        )
        .with_notifier(Arc::new(notifier.clone()));
        Fixture {
            orchestrator,
            clock,
            trip,
            notifier,
        }
    }

    fn seats(ids: &[&str]) -> Vec<SeatId> {
        ids.iter().map(|s| SeatId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_create_booking_commits_seats() {
        let f = fixture();
        let booking = f
            .orchestrator
            .create_booking(
                Actor::anonymous(),
                CreateBooking::new(f.trip.id, seats(&["1A", "1B", "1A"])),
            )
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.seat_ids, seats(&["1A", "1B"]));
        assert_eq!(booking.total_amount, Money::from_cents(3000));
        assert_eq!(booking.version, 1);

        let availability = f.orchestrator.availability(f.trip.id).await.unwrap();
        assert_eq!(availability.available, 1);
        assert_eq!(
            availability.seats[&SeatId::from("1A")],
            SeatState::Committed {
                booking_id: booking.id
            }
        );
        assert_eq!(f.notifier.sent_types(), vec!["BookingCreated"]);
    }

    #[tokio::test]
    async fn test_capacity_exceeded() {
        let f = fixture();
        f.orchestrator
            .hold_seats(
                f.trip.id,
                &seats(&["1A", "1B"]),
                &SessionId::from("other"),
                Duration::minutes(5),
            )
            .await
            .unwrap();

        let err = f
            .orchestrator
            .create_booking(
                Actor::anonymous(),
                CreateBooking::new(f.trip.id, seats(&["1A", "1B"])),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BookingError::CapacityExceeded {
                requested: 2,
                available: 1
            }
        );
    }

    #[tokio::test]
    async fn test_own_holds_count_as_available() {
        let f = fixture();
        let session = SessionId::from("mine");
        f.orchestrator
            .hold_seats(
                f.trip.id,
                &seats(&["1A", "1B", "1C"]),
                &session,
                Duration::minutes(5),
            )
            .await
            .unwrap();

        let booking = f
            .orchestrator
            .create_booking(
                Actor::anonymous(),
                CreateBooking::new(f.trip.id, seats(&["1A", "1B", "1C"]))
                    .with_session(session.clone()),
            )
            .await
            .unwrap();
        assert_eq!(booking.session_id, Some(session));
    }

    #[tokio::test]
    async fn test_passenger_validation() {
        let f = fixture();
        let passenger = |seat: &str| Passenger {
            name: "Ana".to_string(),
            seat_id: SeatId::from(seat),
            phone: None,
            email: None,
        };

        let err = f
            .orchestrator
            .create_booking(
                Actor::anonymous(),
                CreateBooking::new(f.trip.id, seats(&["1A"]))
                    .with_passengers(vec![passenger("1C")]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");

        let err = f
            .orchestrator
            .create_booking(
                Actor::anonymous(),
                CreateBooking::new(f.trip.id, seats(&["1A", "1B"]))
                    .with_passengers(vec![passenger("1A"), passenger("1A")]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");

        let availability = f.orchestrator.availability(f.trip.id).await.unwrap();
        assert_eq!(availability.available, 3);
    }

    #[tokio::test]
    async fn test_confirm_issues_booking_code() {
        let f = fixture();
        let booking = f
            .orchestrator
            .create_booking(Actor::anonymous(), CreateBooking::new(f.trip.id, seats(&["1A"])))
            .await
            .unwrap();

        let confirmed = f
            .orchestrator
            .confirm_booking(Actor::anonymous(), booking.id, PaymentOutcome::Succeeded)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.booking_code.as_deref(), Some("BK-000001"));
        assert_eq!(confirmed.version, 3);

        let err = f
            .orchestrator
            .confirm_booking(Actor::anonymous(), booking.id, PaymentOutcome::Succeeded)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");
    }

    #[tokio::test]
    async fn test_confirm_survives_ticketing_failure() {
        let f = fixture();
        let ticketing = InMemoryTicketIssuer::new();
        ticketing.set_fail_on_issue(true);
        let orchestrator = f.orchestrator.with_ticketing(Arc::new(ticketing));

        let booking = orchestrator
            .create_booking(Actor::anonymous(), CreateBooking::new(f.trip.id, seats(&["1A"])))
            .await
            .unwrap();
        let confirmed = orchestrator
            .confirm_booking(Actor::anonymous(), booking.id, PaymentOutcome::Succeeded)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.booking_code, None);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_booking() {
        let f = fixture();
        f.notifier.set_fail_on_notify(true);
        let booking = f
            .orchestrator
            .create_booking(Actor::anonymous(), CreateBooking::new(f.trip.id, seats(&["1A"])))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(f.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_trip_not_bookable() {
        let f = fixture();
        f.orchestrator
            .complete_trip(Actor::OperatorStaff, f.trip.id)
            .await
            .unwrap();

        let err = f
            .orchestrator
            .hold_seats(
                f.trip.id,
                &seats(&["1A"]),
                &SessionId::from("s"),
                Duration::minutes(5),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BookingError::TripNotBookable {
                trip_id: f.trip.id,
                status: TripStatus::Completed
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_trip() {
        let f = fixture();
        let missing = TripId::new();
        let err = f.orchestrator.availability(missing).await.unwrap_err();
        assert_eq!(err, BookingError::TripNotFound(missing));
    }

    #[tokio::test]
    async fn test_release_holds_on_unopened_trip() {
        let f = fixture();
        let released = f
            .orchestrator
            .release_holds(f.trip.id, &SessionId::from("s"))
            .await
            .unwrap();
        assert_eq!(released, 0);
    }

    #[tokio::test]
    async fn test_staff_only_operations() {
        let f = fixture();
        let customer = Actor::customer(CustomerId::new());

        assert_eq!(
            f.orchestrator
                .bookings_for_trip(customer, f.trip.id)
                .await
                .unwrap_err(),
            BookingError::NotAuthorized {
                action: "list trip bookings"
            }
        );
        assert_eq!(
            f.orchestrator
                .complete_trip(customer, f.trip.id)
                .await
                .unwrap_err()
                .code(),
            "NOT_AUTHORIZED"
        );
    }

    #[tokio::test]
    async fn test_expire_stale_pending() {
        let f = fixture();
        let booking = f
            .orchestrator
            .create_booking(Actor::anonymous(), CreateBooking::new(f.trip.id, seats(&["1A"])))
            .await
            .unwrap();

        f.clock.advance(Duration::minutes(10));
        assert!(f.orchestrator.expire_stale_pending().await.unwrap().is_empty());

        f.clock.advance(Duration::minutes(5));
        let expired = f.orchestrator.expire_stale_pending().await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, booking.id);
        assert_eq!(expired[0].status, BookingStatus::Cancelled);
        assert_eq!(expired[0].cancellation_reason.as_deref(), Some(EXPIRED_REASON));

        let availability = f.orchestrator.availability(f.trip.id).await.unwrap();
        assert_eq!(availability.available, 3);
        assert!(f.notifier.sent_types().contains(&"BookingExpired"));
    }

    #[test]
    fn test_dedupe_keeps_order() {
        assert_eq!(
            dedupe(&seats(&["2B", "1A", "2B", "3C", "1A"])),
            seats(&["2B", "1A", "3C"])
        );
    }
}
