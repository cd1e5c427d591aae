//! Trip metadata supplied by the route/bus catalog.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Money, SeatId, TripId};
use inventory::SeatMap;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};

/// Lifecycle of a scheduled trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    #[default]
    Scheduled,
    Boarding,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    /// Only scheduled and boarding trips accept holds and bookings.
    pub fn is_bookable(&self) -> bool {
        matches!(self, TripStatus::Scheduled | TripStatus::Boarding)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Scheduled => "scheduled",
            TripStatus::Boarding => "boarding",
            TripStatus::InProgress => "in_progress",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled departure with its vehicle's seat layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    #[serde(default)]
    pub status: TripStatus,
    /// Fare per seat before vouchers.
    pub base_price: Money,
    pub departure_at: DateTime<Utc>,
    pub seat_layout: Vec<SeatId>,
    /// Overrides the default cancellation deadline for this trip.
    #[serde(default)]
    pub cancellation_deadline_hours: Option<u32>,
}

impl Trip {
    pub fn new(
        id: TripId,
        base_price: Money,
        departure_at: DateTime<Utc>,
        seat_layout: Vec<SeatId>,
    ) -> Self {
        Self {
            id,
            status: TripStatus::Scheduled,
            base_price,
            departure_at,
            seat_layout,
            cancellation_deadline_hours: None,
        }
    }

    pub fn with_status(mut self, status: TripStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_cancellation_deadline_hours(mut self, hours: u32) -> Self {
        self.cancellation_deadline_hours = Some(hours);
        self
    }

    pub fn capacity(&self) -> usize {
        self.seat_map().capacity()
    }

    pub fn seat_map(&self) -> SeatMap {
        SeatMap::new(self.seat_layout.iter().cloned())
    }
}

/// Read access to trip metadata owned by the catalog.
#[async_trait]
pub trait TripCatalog: Send + Sync {
    /// Loads a trip by id.
    async fn get(&self, trip_id: TripId) -> Result<Option<Trip>>;

    /// Moves a trip to a new status (boarding, completed, ...).
    async fn set_status(&self, trip_id: TripId, status: TripStatus) -> Result<Trip>;
}

/// In-memory catalog, used by tests and the default server wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTripCatalog {
    trips: Arc<RwLock<HashMap<TripId, Trip>>>,
}

impl InMemoryTripCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-loaded with trips.
    pub fn with_trips(trips: impl IntoIterator<Item = Trip>) -> Self {
        let catalog = Self::new();
        for trip in trips {
            catalog.insert(trip);
        }
        catalog
    }

    /// Adds or replaces a trip.
    pub fn insert(&self, trip: Trip) {
        self.trips
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(trip.id, trip);
    }

    pub fn len(&self) -> usize {
        self.trips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TripCatalog for InMemoryTripCatalog {
    async fn get(&self, trip_id: TripId) -> Result<Option<Trip>> {
        Ok(self
            .trips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&trip_id)
            .cloned())
    }

    async fn set_status(&self, trip_id: TripId, status: TripStatus) -> Result<Trip> {
        let mut trips = self.trips.write().unwrap_or_else(PoisonError::into_inner);
        let trip = trips
            .get_mut(&trip_id)
            .ok_or(BookingError::TripNotFound(trip_id))?;
        trip.status = status;
        Ok(trip.clone())
    }
}
