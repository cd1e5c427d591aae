//! Booking persistence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BookingId, TripId};
use tokio::sync::RwLock;

use crate::booking::{Booking, BookingStatus};
use crate::error::RepositoryError;

/// Storage for booking records.
///
/// Updates are optimistic: the caller passes the version it read, and the
/// write fails with `ConcurrencyConflict` if someone else saved in between.
/// That is how two racing status transitions on one booking are resolved.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Stores a new booking at version 1.
    async fn insert(&self, booking: &Booking) -> Result<Booking, RepositoryError>;

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// Saves `booking` if the stored version still equals `booking.version`.
    ///
    /// Returns the stored record with its new version.
    async fn update(&self, booking: &Booking) -> Result<Booking, RepositoryError>;

    async fn list_by_trip(&self, trip_id: TripId) -> Result<Vec<Booking>, RepositoryError>;

    /// Pending bookings created at or before `cutoff`, oldest first.
    async fn list_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepositoryError>;
}

/// In-memory booking store.
#[derive(Clone, Default)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored bookings.
    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<Booking, RepositoryError> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(RepositoryError::Duplicate(booking.id));
        }
        let mut stored = booking.clone();
        stored.version = 1;
        bookings.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn update(&self, booking: &Booking) -> Result<Booking, RepositoryError> {
        let mut bookings = self.bookings.write().await;
        let current = bookings
            .get_mut(&booking.id)
            .ok_or(RepositoryError::NotFound(booking.id))?;

        if current.version != booking.version {
            return Err(RepositoryError::ConcurrencyConflict {
                booking_id: booking.id,
                expected: booking.version,
                actual: current.version,
            });
        }

        let mut stored = booking.clone();
        stored.version = booking.version + 1;
        *current = stored.clone();
        Ok(stored)
    }

    async fn list_by_trip(&self, trip_id: TripId) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.read().await;
        let mut found: Vec<Booking> = bookings
            .values()
            .filter(|b| b.trip_id == trip_id)
            .cloned()
            .collect();
        found.sort_by_key(|b| b.created_at);
        Ok(found)
    }

    async fn list_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.read().await;
        let mut found: Vec<Booking> = bookings
            .values()
            .filter(|b| b.status == BookingStatus::Pending && b.created_at <= cutoff)
            .cloned()
            .collect();
        found.sort_by_key(|b| b.created_at);
        Ok(found)
    }
}
