//! Booking lifecycle on top of the seat inventory.
//!
//! [`BookingOrchestrator`] turns held seats into bookings and walks them
//! through `pending → confirmed → completed`, or to `cancelled` on payment
//! failure, expiry or request. Seat state lives in the `inventory` crate;
//! this crate owns booking records, cancellation rules and the collaborator
//! seams (catalog, pricing, ticketing, notification).

pub mod actor;
pub mod booking;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod policy;
pub mod repository;
pub mod services;
pub mod trip;

pub use actor::Actor;
pub use booking::{Booking, BookingStatus, Passenger, PaymentOutcome};
pub use error::{BookingError, RepositoryError, Result};
pub use events::BookingEvent;
pub use orchestrator::{BookingOrchestrator, CreateBooking, TripAvailability};
pub use policy::BookingPolicy;
pub use repository::{BookingRepository, InMemoryBookingRepository};
pub use services::{
    FlatFarePricing, InMemoryNotifier, InMemoryTicketIssuer, Notifier, PricingRequest,
    PricingService, Ticket, TicketBundle, TicketIssuer,
};
pub use trip::{InMemoryTripCatalog, Trip, TripCatalog, TripStatus};
