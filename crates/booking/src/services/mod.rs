//! External collaborator traits and in-memory implementations.

pub mod notification;
pub mod pricing;
pub mod ticketing;

pub use notification::{InMemoryNotifier, Notifier};
pub use pricing::{FlatFarePricing, PricingRequest, PricingService};
pub use ticketing::{InMemoryTicketIssuer, Ticket, TicketBundle, TicketIssuer};
