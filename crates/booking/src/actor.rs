//! Caller capabilities, decided once at the boundary.

use common::CustomerId;
use serde::{Deserialize, Serialize};

use crate::booking::Booking;

/// Who is calling, as established by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    /// A traveller. Anonymous customers carry no id.
    Customer { customer_id: Option<CustomerId> },
    /// Depot or ticket-office staff.
    OperatorStaff,
    Admin,
}

impl Actor {
    pub fn anonymous() -> Self {
        Actor::Customer { customer_id: None }
    }

    pub fn customer(customer_id: CustomerId) -> Self {
        Actor::Customer {
            customer_id: Some(customer_id),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Actor::OperatorStaff | Actor::Admin)
    }

    /// Only admins may cancel inside the no-cancel window.
    pub fn can_override_deadline(&self) -> bool {
        matches!(self, Actor::Admin)
    }

    /// Customer id to stamp on bookings this actor creates.
    pub fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Actor::Customer { customer_id } => *customer_id,
            _ => None,
        }
    }

    /// Staff act on any booking. Customers act on their own bookings and on
    /// bookings made without an account.
    pub fn may_manage(&self, booking: &Booking) -> bool {
        match self {
            Actor::OperatorStaff | Actor::Admin => true,
            Actor::Customer { customer_id } => {
                booking.customer_id.is_none() || booking.customer_id == *customer_id
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Customer { .. } => "customer",
            Actor::OperatorStaff => "staff",
            Actor::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
